//! Observer - batching hook for view mutations.

use std::cell::RefCell;

use crate::error::{Error, Result};
use crate::view::View;

/// Opens a batching scope on the view. Modules use it to group the view
/// mutations they trigger; the scope itself has no body.
pub struct Observer<'a, V: View> {
    view: &'a RefCell<Option<V>>,
}

impl<'a, V: View> Observer<'a, V> {
    pub(crate) fn new(view: &'a RefCell<Option<V>>) -> Self {
        Self { view }
    }

    pub fn invoke(&self) -> Result<()> {
        let mut view = self
            .view
            .try_borrow_mut()
            .map_err(|_| Error::View("view is busy with a digest".into()))?;
        let view = view.as_mut().ok_or(Error::NotWired("view"))?;
        view.batch(|_| {});
        Ok(())
    }
}
