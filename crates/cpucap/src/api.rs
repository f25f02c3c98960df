//! Seams towards the collaborator that exposes the table
//!
//! The attribute layer (a read/write parameter file, a shell, a test driver)
//! only needs [`CapacityAttribute`]; whoever owns process bring-up and teardown
//! drives [`ModuleLifecycle`].

use crate::controller::OverrideController;
use crate::error::OverrideResult;
use tracing::info;

/// Read/write attribute backed by the override table
pub trait CapacityAttribute {
    /// Write side: apply `raw`
    ///
    /// # Errors
    /// Any [`OverrideError`](crate::OverrideError); use
    /// [`errno`](crate::OverrideError::errno) to turn it into a status code
    fn store(&self, raw: Option<&str>) -> OverrideResult<()>;

    /// Read side: last accepted string followed by a single newline
    fn show(&self) -> String;
}

/// Bring-up and teardown hooks
pub trait ModuleLifecycle {
    /// Called once at start; must not touch the table
    fn on_load(&self);

    /// Called once at end; puts pristine values back
    fn on_unload(&self);
}

impl CapacityAttribute for OverrideController {
    fn store(&self, raw: Option<&str>) -> OverrideResult<()> {
        self.set_configuration(raw)
    }

    fn show(&self) -> String {
        format!("{}\n", self.get_configuration())
    }
}

impl ModuleLifecycle for OverrideController {
    fn on_load(&self) {
        self.log_loaded();
    }

    fn on_unload(&self) {
        if self.restore() {
            info!("unloaded, original capacities restored");
        } else {
            info!("unloaded, no override was applied");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CapacityStore;
    use crate::OverrideError;

    fn controller() -> OverrideController {
        OverrideController::new(CapacityStore::uniform(4, 1024, 1024).unwrap())
    }

    #[test]
    fn show_appends_newline() {
        let ctl = controller();
        assert_eq!(ctl.show(), "\n");

        ctl.store(Some("0-1:512\n")).unwrap();
        assert_eq!(ctl.show(), "0-1:512\n");
    }

    #[test]
    fn store_reports_status_code() {
        let ctl = controller();
        let err = ctl.store(Some("4:1")).unwrap_err();
        assert_eq!(err, OverrideError::OutOfRange { unit: 4, units: 4 });
        assert_eq!(err.errno(), -22);
    }

    #[test]
    fn load_does_not_mutate() {
        let ctl = controller();
        ctl.on_load();
        assert!(!ctl.is_saved());
        assert_eq!(ctl.table().values, vec![1024; 4]);
    }

    #[test]
    fn unload_restores() {
        let ctl = controller();
        ctl.store(Some("0-3:0")).unwrap();
        ctl.on_unload();
        assert_eq!(ctl.table().values, vec![1024; 4]);
        assert!(!ctl.is_saved());

        // Second teardown has nothing left to restore
        ctl.on_unload();
        assert_eq!(ctl.table().values, vec![1024; 4]);
    }
}
