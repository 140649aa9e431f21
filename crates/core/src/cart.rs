//! Client-side cart arithmetic.
//!
//! Lines are keyed by printing and finish, so the foil and nonfoil copies of
//! the same card are separate lines. Quantities never exceed the stock known
//! when the line was last touched.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::printing::Printing;
use crate::types::{Finish, Price, PrintingId};

/// Errors from cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("{0} is out of stock")]
    OutOfStock(PrintingId),

    #[error("{0} has no price")]
    Unpriced(PrintingId),

    #[error("{id} ({finish}) is not in the cart")]
    NotInCart { id: PrintingId, finish: Finish },
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub printing_id: PrintingId,
    pub finish: Finish,
    pub name: String,
    pub set_code: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    /// Stock available when the line was last updated.
    pub available: u32,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        Price::usd(self.unit_price).times(self.quantity)
    }
}

/// A shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line for a printing and finish, if present.
    #[must_use]
    pub fn line(&self, id: &PrintingId, finish: Finish) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|l| &l.printing_id == id && l.finish == finish)
    }

    fn position(&self, id: &PrintingId, finish: Finish) -> Option<usize> {
        self.lines
            .iter()
            .position(|l| &l.printing_id == id && l.finish == finish)
    }

    /// Add copies of a printing. Merges with an existing line and clamps the
    /// total to available stock. Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfStock`] when the printing has no stock and
    /// [`CartError::Unpriced`] when it has no market price.
    pub fn add(&mut self, printing: &Printing, quantity: u32) -> Result<u32, CartError> {
        if !printing.in_stock() {
            return Err(CartError::OutOfStock(printing.id.clone()));
        }
        let unit_price = printing
            .price
            .ok_or_else(|| CartError::Unpriced(printing.id.clone()))?;

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.printing_id == printing.id && l.finish == printing.finish)
        {
            line.unit_price = unit_price;
            line.available = printing.stock;
            line.quantity = line.quantity.saturating_add(quantity).min(line.available);
            return Ok(line.quantity);
        }

        let quantity = quantity.min(printing.stock);
        self.lines.push(CartLine {
            printing_id: printing.id.clone(),
            finish: printing.finish,
            name: printing.name.clone(),
            set_code: printing.set_code.clone(),
            unit_price,
            quantity,
            available: printing.stock,
        });
        Ok(quantity)
    }

    /// Set a line's quantity. Zero removes the line. Returns the clamped
    /// quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if there is no such line.
    pub fn set_quantity(
        &mut self,
        id: &PrintingId,
        finish: Finish,
        quantity: u32,
    ) -> Result<u32, CartError> {
        if quantity == 0 {
            return self
                .remove(id, finish)
                .map(|_| 0)
                .ok_or_else(|| CartError::NotInCart {
                    id: id.clone(),
                    finish,
                });
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| &l.printing_id == id && l.finish == finish)
            .ok_or_else(|| CartError::NotInCart {
                id: id.clone(),
                finish,
            })?;
        line.quantity = quantity.min(line.available);
        Ok(line.quantity)
    }

    /// Remove a line, returning it.
    pub fn remove(&mut self, id: &PrintingId, finish: Finish) -> Option<CartLine> {
        self.position(id, finish).map(|i| self.lines.remove(i))
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let amount = self
            .lines
            .iter()
            .map(|l| l.line_total().amount)
            .sum::<Decimal>();
        Price::usd(amount)
    }

    /// Total number of copies across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
