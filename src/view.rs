//! Pieces shared by the checker and history view models.

use serde::Serialize;

/// Lifecycle of a view: `Idle → Loading → {Rendered | Error}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Rendered,
    Error,
}

/// Probability in `[0, 1]` as a whole percentage, rounding halves up.
///
/// Non-finite input renders as `0`.
pub fn confidence_pct(probability: f64) -> i64 {
    if !probability.is_finite() {
        return 0;
    }
    (probability * 100.0 + 0.5).floor() as i64
}

/// Observer told when a view enters (`true`) and leaves (`false`) its busy
/// state. This is how a front end shows the loading indicator and disables
/// its trigger while a request is in flight.
pub type BusyHook = Box<dyn FnMut(bool)>;

/// Clears a busy flag when dropped, however the guarded call settles.
pub(crate) struct BusyGuard<'a> {
    flag: &'a mut bool,
    hook: Option<&'a mut BusyHook>,
}

impl<'a> BusyGuard<'a> {
    pub(crate) fn engage(flag: &'a mut bool, mut hook: Option<&'a mut BusyHook>) -> Self {
        *flag = true;
        if let Some(notify) = hook.as_deref_mut() {
            notify(true);
        }
        Self { flag, hook }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.flag = false;
        if let Some(notify) = self.hook.as_deref_mut() {
            notify(false);
        }
    }
}
