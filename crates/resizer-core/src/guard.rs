//! Scoped host-state guards.
//!
//! Each guard captures a piece of host UI or calculation state when it is
//! created, applies a temporary override, and restores the captured state
//! when it is dropped. Drop runs on every exit path, including early `?`
//! returns and unwinding, so nested guards are released innermost first.
//! A failed restore is logged and the remaining restore steps still run.

use log::warn;
use resizer_engine::engine::CellRange;

use crate::error::Result;
use crate::host::{CalculationMode, Host};

/// Turns screen updating off for the guard's lifetime.
pub struct EchoOff<'h, H: Host + ?Sized> {
    host: &'h H,
    previous: bool,
}

impl<'h, H: Host + ?Sized> EchoOff<'h, H> {
    pub fn new(host: &'h H) -> Result<Self> {
        let previous = host.screen_echo()?;
        host.set_screen_echo(false)?;
        Ok(EchoOff { host, previous })
    }
}

impl<H: Host + ?Sized> Drop for EchoOff<'_, H> {
    fn drop(&mut self) {
        if let Err(e) = self.host.set_screen_echo(self.previous) {
            warn!("failed to restore screen echo: {}", e);
        }
    }
}

/// Forces manual calculation for the guard's lifetime.
pub struct ManualCalculation<'h, H: Host + ?Sized> {
    host: &'h H,
    previous: CalculationMode,
}

impl<'h, H: Host + ?Sized> ManualCalculation<'h, H> {
    pub fn new(host: &'h H) -> Result<Self> {
        let previous = host.calculation_mode()?;
        host.set_calculation_mode(CalculationMode::Manual)?;
        Ok(ManualCalculation { host, previous })
    }
}

impl<H: Host + ?Sized> Drop for ManualCalculation<'_, H> {
    fn drop(&mut self) {
        if let Err(e) = self.host.set_calculation_mode(self.previous) {
            warn!("failed to restore calculation mode: {}", e);
        }
    }
}

/// Selection and active cell on one sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub range: CellRange,
    pub active_cell: CellRange,
}

impl Selection {
    fn capture<H: Host + ?Sized>(host: &H) -> Result<Self> {
        Ok(Selection {
            range: host.selection()?,
            active_cell: host.active_cell()?,
        })
    }
}

/// Selects a range, switching to its sheet if needed, so that commands
/// acting on the current selection can reach it.
///
/// On drop the target sheet's old selection is restored, the originally
/// active sheet is reselected, and its old selection is restored. Work done
/// inside the scope must not switch sheets or create new ones.
pub struct SelectionScope<'h, H: Host + ?Sized> {
    host: &'h H,
    active: Selection,
    target: Option<Selection>,
}

impl<'h, H: Host + ?Sized> SelectionScope<'h, H> {
    pub fn new(host: &'h H, target: &CellRange) -> Result<Self> {
        let active = Selection::capture(host)?;

        let sheet = host.sheet_name(target)?;
        host.select_workbook_sheet(&sheet)?;

        // From here on, drop switches back to the original sheet.
        let mut scope = SelectionScope {
            host,
            active,
            target: None,
        };
        scope.target = Some(Selection::capture(host)?);
        host.select_range(target, None)?;
        Ok(scope)
    }
}

impl<H: Host + ?Sized> Drop for SelectionScope<'_, H> {
    fn drop(&mut self) {
        if let Some(target) = self.target
            && let Err(e) = self.host.select_range(&target.range, Some(&target.active_cell))
        {
            warn!("failed to restore selection on target sheet: {}", e);
        }

        match self.host.sheet_name(&self.active.range) {
            Ok(sheet) => {
                if let Err(e) = self.host.select_workbook_sheet(&sheet) {
                    warn!("failed to reselect sheet {}: {}", sheet, e);
                }
            }
            Err(e) => warn!("failed to resolve active sheet name: {}", e),
        }

        if let Err(e) = self
            .host
            .select_range(&self.active.range, Some(&self.active.active_cell))
        {
            warn!("failed to restore selection on active sheet: {}", e);
        }
    }
}
