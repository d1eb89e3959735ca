//! [`NativeWindow`]: exclusive owner of one native window handle.

use tracing::{trace, warn};

use super::{CreateParams, Handle, Platform};
use crate::error::{Error, Result};
use crate::geometry::Rectangle;
use crate::logging::targets;

/// Owns a native window from creation until [`release`](Self::release).
///
/// The handle is released at most once; later calls are no-ops. Dropping a
/// `NativeWindow` without releasing it leaks the native window, so owners
/// release explicitly during disposal.
#[derive(Debug)]
pub struct NativeWindow {
    handle: Option<Handle>,
    class: &'static str,
}

impl NativeWindow {
    /// Ask the platform for a new window.
    pub fn create(platform: &mut dyn Platform, params: &CreateParams) -> Result<Self> {
        let handle = platform.create_window(params)?;
        trace!(target: targets::NATIVE, %handle, class = params.class, "created window");
        Ok(Self {
            handle: Some(handle),
            class: params.class,
        })
    }

    /// A window that was never created, for unit tests of widget state.
    #[cfg(test)]
    pub(crate) fn released(class: &'static str) -> Self {
        Self { handle: None, class }
    }

    /// The live handle. Once released this reports the window as gone.
    pub fn handle(&self) -> Result<Handle> {
        self.handle.ok_or_else(|| Error::native("window handle", "window already released"))
    }

    /// The window class this window was created with.
    pub fn class(&self) -> &'static str {
        self.class
    }

    /// Whether [`release`](Self::release) already ran.
    pub fn is_released(&self) -> bool {
        self.handle.is_none()
    }

    /// Move and resize the window.
    pub fn set_bounds(&self, platform: &mut dyn Platform, bounds: Rectangle) -> Result<()> {
        platform.set_bounds(self.handle()?, bounds)
    }

    /// Destroy the native window. Returns the handle that was released, or
    /// `None` when it was already gone.
    pub fn release(&mut self, platform: &mut dyn Platform) -> Option<Handle> {
        let handle = self.handle.take()?;
        if platform.is_window(handle) {
            if let Err(err) = platform.destroy_window(handle) {
                warn!(target: targets::NATIVE, %handle, %err, "destroying window failed");
            }
        }
        trace!(target: targets::NATIVE, %handle, "released window");
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{class, HeadlessPlatform, NativeOp};

    #[test]
    fn create_and_release_once() {
        let mut platform = HeadlessPlatform::new();
        let mut window =
            NativeWindow::create(&mut platform, &CreateParams::new(class::COMBO_BOX)).unwrap();
        let handle = window.handle().unwrap();
        assert!(platform.is_window(handle));
        assert_eq!(window.class(), class::COMBO_BOX);

        assert_eq!(window.release(&mut platform), Some(handle));
        assert!(!platform.is_window(handle));
        assert!(window.is_released());
        assert!(window.handle().is_err());

        assert_eq!(window.release(&mut platform), None);
    }

    #[test]
    fn create_failure_reports_creation_error() {
        let mut platform = HeadlessPlatform::new();
        let err = NativeWindow::create(&mut platform, &CreateParams::new("NoSuchClass"))
            .unwrap_err();
        assert!(matches!(err, Error::NativeCreation { .. }));
        assert_eq!(platform.window_count(), 0);
    }

    #[test]
    fn release_tolerates_window_destroyed_by_parent() {
        let mut platform = HeadlessPlatform::new();
        let mut parent =
            NativeWindow::create(&mut platform, &CreateParams::new(class::COMBO_BOX)).unwrap();
        let mut child = NativeWindow::create(
            &mut platform,
            &CreateParams::new(class::COMBO_BOX).with_parent(Some(parent.handle().unwrap())),
        )
        .unwrap();

        parent.release(&mut platform);
        assert!(child.release(&mut platform).is_some());
        assert_eq!(platform.window_count(), 0);
    }

    #[test]
    fn release_survives_destroy_failure() {
        let mut platform = HeadlessPlatform::new();
        let mut window =
            NativeWindow::create(&mut platform, &CreateParams::new(class::COMBO_BOX)).unwrap();
        platform.fail_next(NativeOp::DestroyWindow);
        assert!(window.release(&mut platform).is_some());
        assert!(window.is_released());
    }
}
