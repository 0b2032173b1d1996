//! Position-reindexing operations.
//!
//! Every operation here is one call to [`BoardStore::transaction`]: it either
//! commits with positions dense again, or rolls back and leaves the board as
//! it was. Positions are zero-based and scoped to the board (columns) or to a
//! single column (cards).

use chrono::Utc;
use uuid::Uuid;

use super::models::{
    Board, Card, CardMove, CardUpdate, Column, PositionUpdate, validate_color, validate_position,
    validate_title,
};
use super::store::BoardStore;
use crate::errors::{BoardError, BoardResult};

/// A range update that closes or opens a gap: add `delta` to every sibling
/// whose position lies in `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub from: i64,
    pub to: i64,
    pub delta: i64,
}

/// Plan the sibling shift for moving one entity from `old` to `new` within a
/// single scope. `None` when nothing moves.
pub fn plan_shift(old: i64, new: i64) -> Option<Shift> {
    if new > old {
        Some(Shift {
            from: old + 1,
            to: new,
            delta: -1,
        })
    } else if new < old {
        Some(Shift {
            from: new,
            to: old - 1,
            delta: 1,
        })
    } else {
        None
    }
}

/// The slot after `position`: where an append lands or a compaction starts.
fn after(position: i64) -> BoardResult<i64> {
    position
        .checked_add(1)
        .ok_or_else(|| BoardError::validation(format!("position {} has no successor", position)))
}

fn next_position(max: Option<i64>) -> BoardResult<i64> {
    max.map_or(Ok(0), after)
}

fn check_target(position: i64, upper: i64) -> BoardResult<()> {
    if position < 0 || position > upper {
        return Err(BoardError::validation(format!(
            "position {} is out of range 0..={}",
            position, upper
        )));
    }
    Ok(())
}

impl BoardStore {
    pub fn get_board(&self) -> BoardResult<Board> {
        Ok(Board {
            columns: self.list_columns_ordered()?,
        })
    }

    // ── Append ────────────────────────────────────────────────────────

    pub fn append_column(&self, title: &str) -> BoardResult<Column> {
        let title = validate_title(title)?;
        self.transaction(move |tx| {
            let position = next_position(tx.max_column_position()?)?;
            let id = Uuid::new_v4().to_string();
            tx.insert_column(&id, &title, position)?;
            Ok(Column {
                id,
                title,
                position,
                cards: Vec::new(),
            })
        })
    }

    pub fn append_card(&self, column_id: &str, title: &str, description: &str) -> BoardResult<Card> {
        let title = validate_title(title)?;
        self.transaction(|tx| {
            tx.require_column(column_id)?;
            let position = next_position(tx.max_card_position(column_id)?)?;
            let card = Card {
                id: Uuid::new_v4().to_string(),
                title,
                description: description.to_string(),
                created_at: Utc::now(),
                column_id: column_id.to_string(),
                position,
                color: None,
            };
            tx.insert_card(&card)?;
            // Re-read so the timestamp carries the stored precision.
            tx.require_card(&card.id)
        })
    }

    // ── Delete-and-compact ────────────────────────────────────────────

    pub fn delete_column(&self, column_id: &str) -> BoardResult<()> {
        self.transaction(|tx| {
            let column = tx.require_column(column_id)?;
            tx.delete_cards_in_column(column_id)?;
            tx.delete_column_row(column_id)?;
            tx.shift_columns(after(column.position)?, None, -1)?;
            Ok(())
        })
    }

    pub fn delete_card(&self, card_id: &str) -> BoardResult<()> {
        self.transaction(|tx| {
            let card = tx.require_card(card_id)?;
            tx.delete_card_row(card_id)?;
            tx.shift_cards(&card.column_id, after(card.position)?, None, -1)?;
            Ok(())
        })
    }

    // ── Move within one scope ─────────────────────────────────────────

    /// Move a column to `position` on the board, shifting the columns in
    /// between by one.
    pub fn move_column(&self, column_id: &str, position: i64) -> BoardResult<Column> {
        self.transaction(|tx| {
            let column = tx.require_column(column_id)?;
            check_target(position, tx.column_count()? - 1)?;
            if let Some(shift) = plan_shift(column.position, position) {
                tx.shift_columns(shift.from, Some(shift.to), shift.delta)?;
                tx.set_column_position(column_id, position)?;
            }
            let record = tx.require_column(column_id)?;
            let cards = tx.list_cards(column_id)?;
            Ok(Column::from_record(record, cards))
        })
    }

    /// Move a card to `position` inside its current column.
    pub fn reposition_card(&self, card_id: &str, position: i64) -> BoardResult<Card> {
        self.transaction(|tx| {
            let card = tx.require_card(card_id)?;
            check_target(position, tx.card_count(&card.column_id)? - 1)?;
            if let Some(shift) = plan_shift(card.position, position) {
                tx.shift_cards(&card.column_id, shift.from, Some(shift.to), shift.delta)?;
                tx.set_card_position(card_id, &card.column_id, position)?;
            }
            tx.require_card(card_id)
        })
    }

    // ── Move across scopes ────────────────────────────────────────────

    /// Move a card to another column. The card must currently live in
    /// `mv.from_column_id`; the target may be anywhere in `0..=len(dest)`.
    pub fn move_card(&self, card_id: &str, mv: &CardMove) -> BoardResult<Card> {
        self.transaction(|tx| {
            let card = tx.require_card(card_id)?;
            if card.column_id != mv.from_column_id {
                return Err(BoardError::Conflict {
                    card_id: card_id.to_string(),
                    expected: mv.from_column_id.clone(),
                    actual: card.column_id,
                });
            }
            tx.require_column(&mv.to_column_id)?;

            if mv.to_column_id == mv.from_column_id {
                check_target(mv.position, tx.card_count(&card.column_id)? - 1)?;
                if let Some(shift) = plan_shift(card.position, mv.position) {
                    tx.shift_cards(&card.column_id, shift.from, Some(shift.to), shift.delta)?;
                    tx.set_card_position(card_id, &card.column_id, mv.position)?;
                }
                return tx.require_card(card_id);
            }

            check_target(mv.position, tx.card_count(&mv.to_column_id)?)?;
            tx.shift_cards(&mv.from_column_id, after(card.position)?, None, -1)?;
            tx.shift_cards(&mv.to_column_id, mv.position, None, 1)?;
            tx.set_card_placement(card_id, &mv.to_column_id, mv.position)?;
            tx.require_card(card_id)
        })
    }

    // ── Bulk reposition ───────────────────────────────────────────────

    /// Write client-supplied column positions as given. Unknown ids are
    /// skipped. Returns the number of columns written.
    ///
    /// The positions are trusted: nothing checks that they form a dense
    /// permutation.
    pub fn reposition_columns(&self, updates: &[PositionUpdate]) -> BoardResult<usize> {
        for update in updates {
            validate_position(update.position)?;
        }
        self.transaction(|tx| {
            let mut written = 0;
            for update in updates {
                written += tx.set_column_position(&update.id, update.position)?;
            }
            Ok(written)
        })
    }

    /// Write client-supplied card positions within one column. Ids that are
    /// unknown, or that belong to another column, are skipped.
    pub fn reposition_cards(
        &self,
        column_id: &str,
        updates: &[PositionUpdate],
    ) -> BoardResult<usize> {
        for update in updates {
            validate_position(update.position)?;
        }
        self.transaction(|tx| {
            tx.require_column(column_id)?;
            let mut written = 0;
            for update in updates {
                written += tx.set_card_position(&update.id, column_id, update.position)?;
            }
            Ok(written)
        })
    }

    // ── Non-positional edits ──────────────────────────────────────────

    pub fn update_card(&self, card_id: &str, update: &CardUpdate) -> BoardResult<Card> {
        let title = validate_title(&update.title)?;
        if let Some(color) = &update.color {
            validate_color(color)?;
        }
        self.transaction(|tx| {
            tx.require_card(card_id)?;
            tx.update_card_fields(
                card_id,
                &title,
                &update.description,
                update.color.as_deref(),
            )?;
            tx.require_card(card_id)
        })
    }

    pub fn update_column_title(&self, column_id: &str, title: &str) -> BoardResult<Column> {
        let title = validate_title(title)?;
        self.transaction(|tx| {
            tx.require_column(column_id)?;
            tx.update_column_title(column_id, &title)?;
            let record = tx.require_column(column_id)?;
            let cards = tx.list_cards(column_id)?;
            Ok(Column::from_record(record, cards))
        })
    }
}
