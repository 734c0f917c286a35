use std::collections::HashMap;

use crate::models::{GuessResult, LetterStatus};

/// Score a guess against the answer
///
/// Both words are uppercased before comparison. Callers are expected to pass
/// words of equal length; positions are counted in characters.
///
/// # Algorithm
/// 1. Count every letter of the answer
/// 2. First pass: exact matches become `InPosition` and use up one count
/// 3. Second pass, left to right over the rest: a letter with count left
///    becomes `OutOfPosition` and uses it up, otherwise `NotInWord`
///
/// Earlier positions therefore win when the guess repeats a letter more often
/// than the answer contains it.
pub fn score(guess: &str, answer: &str) -> GuessResult {
    let guess: Vec<char> = guess.to_uppercase().chars().collect();
    let answer: Vec<char> = answer.to_uppercase().chars().collect();

    let mut remaining: HashMap<char, usize> = HashMap::new();
    for &ch in &answer {
        *remaining.entry(ch).or_insert(0) += 1;
    }

    let mut statuses = vec![LetterStatus::NotInWord; guess.len()];

    for (i, &ch) in guess.iter().enumerate() {
        if answer.get(i) == Some(&ch) {
            statuses[i] = LetterStatus::InPosition;
            if let Some(count) = remaining.get_mut(&ch) {
                *count -= 1;
            }
        }
    }

    for (i, &ch) in guess.iter().enumerate() {
        if statuses[i] == LetterStatus::InPosition {
            continue;
        }
        if let Some(count) = remaining.get_mut(&ch) {
            if *count > 0 {
                statuses[i] = LetterStatus::OutOfPosition;
                *count -= 1;
            }
        }
    }

    GuessResult {
        correct: guess == answer,
        letter_statuses: statuses.into_iter().enumerate().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LetterStatus::{InPosition as G, NotInWord as X, OutOfPosition as Y};

    fn statuses(guess: &str, answer: &str) -> Vec<LetterStatus> {
        score(guess, answer).letter_statuses.into_values().collect()
    }

    #[test]
    fn test_exact_guess_is_correct() {
        let result = score("APPLE", "APPLE");
        assert!(result.correct);
        assert!(result.letter_statuses.values().all(|&s| s == G));
        assert_eq!(result.letter_statuses.len(), 5);
    }

    #[test]
    fn test_case_insensitive() {
        let result = score("apple", "APPLE");
        assert!(result.correct);
        assert_eq!(statuses("crane", "SLATE"), vec![X, X, G, X, G]);
    }

    #[test]
    fn test_duplicate_letters_papal() {
        // A:1 P:2 L:1 E:1 in the answer
        assert_eq!(statuses("PAPAL", "APPLE"), vec![Y, Y, G, X, Y]);
    }

    #[test]
    fn test_duplicate_letters_babyy() {
        assert_eq!(statuses("BABYY", "ABBEY"), vec![Y, Y, G, X, G]);
    }

    #[test]
    fn test_earlier_position_wins_duplicate() {
        // only one E left for the two misplaced guesses
        assert_eq!(statuses("EERIE", "THREE"), vec![Y, X, G, X, G]);
        assert_eq!(statuses("LLAMA", "HELLO"), vec![Y, Y, X, X, X]);
    }

    #[test]
    fn test_distinct_letters_reduce_to_membership() {
        let answer = "CRANE";
        let guess = "NACRE";
        let result = statuses(guess, answer);
        for (i, (g, a)) in guess.chars().zip(answer.chars()).enumerate() {
            let expected = if g == a {
                G
            } else if answer.contains(g) {
                Y
            } else {
                X
            };
            assert_eq!(result[i], expected, "position {}", i);
        }
    }

    #[test]
    fn test_letter_count_conservation() {
        let pairs = [
            ("PAPAL", "APPLE"),
            ("BABYY", "ABBEY"),
            ("EEEEE", "THREE"),
            ("LLLLL", "HELLO"),
            ("SASSY", "ASSES"),
            ("MAMMA", "MADAM"),
        ];
        for (guess, answer) in pairs {
            let result = statuses(guess, answer);
            for letter in guess.chars() {
                let marked = guess
                    .chars()
                    .zip(&result)
                    .filter(|&(ch, s)| ch == letter && *s != X)
                    .count();
                let available = answer.chars().filter(|&ch| ch == letter).count();
                assert!(
                    marked <= available,
                    "{} marked {} times for {}/{}",
                    letter,
                    marked,
                    guess,
                    answer
                );
            }
        }
    }

    #[test]
    fn test_absent_letters_never_marked() {
        assert_eq!(statuses("QUICK", "APPLE"), vec![X, X, X, X, X]);
    }

    #[test]
    fn test_multibyte_letters_count_as_one_position() {
        assert_eq!(statuses("GÓRA", "góra"), vec![G, G, G, G]);
        assert_eq!(statuses("ÓRAG", "GÓRA"), vec![Y, Y, Y, Y]);
    }

    #[test]
    fn test_mismatched_length_does_not_panic() {
        let result = score("APPLES", "APPLE");
        assert!(!result.correct);
        assert_eq!(result.letter_statuses.len(), 6);
        assert_eq!(result.letter_statuses[&5], X);
    }
}
