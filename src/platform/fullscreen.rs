/// Fullscreen API surface, including the vendor-prefixed variants some hosts
/// still expose instead of the standard one.

use crate::{Error, Result};
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenVariant {
    Standard,
    Webkit,
    Ms,
}

pub trait FullscreenApi {
    /// Key of the element currently shown fullscreen, if any
    fn fullscreen_element(&self) -> Option<String>;
    fn request_fullscreen(&self, key: &str) -> Result<()>;
    fn exit_fullscreen(&self) -> Result<()>;
}

/// Fullscreen emulation that picks the first variant the host offers, in the
/// order standard, webkit, ms.
#[derive(Debug)]
pub struct VendorFullscreen {
    available: Vec<FullscreenVariant>,
    current: RefCell<Option<String>>,
    last_variant: RefCell<Option<FullscreenVariant>>,
}

impl VendorFullscreen {
    pub fn new(available: Vec<FullscreenVariant>) -> Self {
        VendorFullscreen {
            available,
            current: RefCell::new(None),
            last_variant: RefCell::new(None),
        }
    }

    /// A host without any fullscreen support
    pub fn unsupported() -> Self {
        Self::new(Vec::new())
    }

    /// Variant used by the most recent request or exit
    pub fn last_variant(&self) -> Option<FullscreenVariant> {
        *self.last_variant.borrow()
    }

    fn pick(&self) -> Result<FullscreenVariant> {
        [FullscreenVariant::Standard, FullscreenVariant::Webkit, FullscreenVariant::Ms]
            .into_iter()
            .find(|v| self.available.contains(v))
            .ok_or(Error::FullscreenUnsupported)
    }
}

impl Default for VendorFullscreen {
    fn default() -> Self {
        Self::new(vec![FullscreenVariant::Standard])
    }
}

impl FullscreenApi for VendorFullscreen {
    fn fullscreen_element(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    fn request_fullscreen(&self, key: &str) -> Result<()> {
        let variant = self.pick()?;
        *self.last_variant.borrow_mut() = Some(variant);
        *self.current.borrow_mut() = Some(key.to_string());
        Ok(())
    }

    fn exit_fullscreen(&self) -> Result<()> {
        let variant = self.pick()?;
        *self.last_variant.borrow_mut() = Some(variant);
        *self.current.borrow_mut() = None;
        Ok(())
    }
}
