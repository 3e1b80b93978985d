//! Réordonnancement d'une sélection dans une liste ordonnée (files de lecture, playlists)

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Déplacement appliqué aux positions sélectionnées
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReorderOp {
    MoveToTop,
    MoveToBottom,
    MoveUp,
    MoveDown,
}

/// Renvoie `items` réordonné en déplaçant les éléments aux positions `selected`
///
/// - `MoveToTop` / `MoveToBottom` : les éléments sélectionnés sont regroupés en
///   tête (en fin) dans leur ordre relatif d'origine ; les autres gardent le leur.
/// - `MoveUp` / `MoveDown` : chaque élément sélectionné est échangé avec son
///   voisin, sauf ceux d'un bloc contigu déjà collé à la première (dernière)
///   position, qui restent en place.
///
/// `selected` peut être dans n'importe quel ordre mais doit contenir des
/// indices distincts et valides.
///
/// ```rust
/// use pmocatalog::{reorder, ReorderOp};
///
/// let moved = reorder(vec!['A', 'B', 'C', 'D'], &[3, 1], ReorderOp::MoveToTop)?;
/// assert_eq!(moved, vec!['B', 'D', 'A', 'C']);
/// # Ok::<(), pmocatalog::CatalogError>(())
/// ```
pub fn reorder<T>(mut items: Vec<T>, selected: &[usize], op: ReorderOp) -> Result<Vec<T>> {
    let sorted = validate(selected, items.len())?;

    match op {
        ReorderOp::MoveToTop | ReorderOp::MoveToBottom => {
            let chosen: HashSet<usize> = sorted.iter().copied().collect();
            let mut moved = Vec::with_capacity(chosen.len());
            let mut rest = Vec::with_capacity(items.len() - chosen.len());
            for (i, item) in items.into_iter().enumerate() {
                if chosen.contains(&i) {
                    moved.push(item);
                } else {
                    rest.push(item);
                }
            }
            if op == ReorderOp::MoveToTop {
                moved.extend(rest);
                Ok(moved)
            } else {
                rest.extend(moved);
                Ok(rest)
            }
        }
        ReorderOp::MoveUp => {
            if let Some(first) = first_movable_up(&sorted) {
                for &i in sorted.iter().filter(|&&i| i >= first) {
                    items.swap(i - 1, i);
                }
            }
            Ok(items)
        }
        ReorderOp::MoveDown => {
            if let Some(last) = last_movable_down(&sorted, items.len()) {
                for &i in sorted.iter().rev().filter(|&&i| i <= last) {
                    items.swap(i, i + 1);
                }
            }
            Ok(items)
        }
    }
}

fn validate(selected: &[usize], len: usize) -> Result<Vec<usize>> {
    let mut sorted = selected.to_vec();
    sorted.sort_unstable();
    if let Some(&max) = sorted.last() {
        if max >= len {
            return Err(CatalogError::InvalidSelection(format!(
                "index {max} out of range for {len} items"
            )));
        }
    }
    if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
        return Err(CatalogError::InvalidSelection(format!(
            "index {} selected twice",
            pair[0]
        )));
    }
    Ok(sorted)
}

/// Plus petit indice sélectionné hors du bloc collé à la position 0
fn first_movable_up(sorted: &[usize]) -> Option<usize> {
    sorted
        .iter()
        .enumerate()
        .find(|&(rank, &idx)| idx != rank)
        .map(|(_, &idx)| idx)
}

/// Plus grand indice sélectionné hors du bloc collé à la dernière position
fn last_movable_down(sorted: &[usize], len: usize) -> Option<usize> {
    sorted
        .iter()
        .rev()
        .enumerate()
        .find(|&(rank, &idx)| idx != len - 1 - rank)
        .map(|(_, &idx)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_move_to_top() {
        let out = reorder(letters("ABCD"), &[1, 3], ReorderOp::MoveToTop).unwrap();
        assert_eq!(out, letters("BDAC"));
    }

    #[test]
    fn test_move_to_bottom() {
        let out = reorder(letters("ABCD"), &[1, 3], ReorderOp::MoveToBottom).unwrap();
        assert_eq!(out, letters("ACBD"));
    }

    #[test]
    fn test_move_up_pins_leading_run() {
        let out = reorder(letters("ABCDE"), &[0, 1, 3], ReorderOp::MoveUp).unwrap();
        assert_eq!(out, letters("ABDCE"));
    }

    #[test]
    fn test_move_down_pins_trailing_run() {
        let out = reorder(letters("ABCDE"), &[1, 3, 4], ReorderOp::MoveDown).unwrap();
        assert_eq!(out, letters("ACBDE"));
    }

    #[test]
    fn test_move_up_adjacent_selection_moves_as_block() {
        let out = reorder(letters("ABCDE"), &[3, 2], ReorderOp::MoveUp).unwrap();
        assert_eq!(out, letters("ACDBE"));
    }

    #[test]
    fn test_move_down_adjacent_selection_moves_as_block() {
        let out = reorder(letters("ABCDE"), &[1, 2], ReorderOp::MoveDown).unwrap();
        assert_eq!(out, letters("ADBCE"));
    }

    #[test]
    fn test_everything_pinned_is_identity() {
        let all = [0, 1, 2];
        for op in [ReorderOp::MoveUp, ReorderOp::MoveDown] {
            assert_eq!(reorder(letters("ABC"), &all, op).unwrap(), letters("ABC"));
        }
    }

    #[test]
    fn test_empty_selection_is_identity() {
        for op in [
            ReorderOp::MoveToTop,
            ReorderOp::MoveToBottom,
            ReorderOp::MoveUp,
            ReorderOp::MoveDown,
        ] {
            assert_eq!(reorder(letters("ABC"), &[], op).unwrap(), letters("ABC"));
        }
    }

    #[test]
    fn test_invalid_selection() {
        assert!(matches!(
            reorder(letters("ABC"), &[3], ReorderOp::MoveUp),
            Err(CatalogError::InvalidSelection(_))
        ));
        assert!(matches!(
            reorder(letters("ABC"), &[1, 1], ReorderOp::MoveDown),
            Err(CatalogError::InvalidSelection(_))
        ));
    }
}
