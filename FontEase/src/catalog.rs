//! Font Catalog Reader
//!
//! Enumerates fonts registered with the OS. Every call re-reads the
//! platform; nothing is cached across calls, so the result always reflects
//! what the OS knows at call time.

use crate::error::{FontError, Result};
use crate::platform::FontPlatform;
use crate::state::FontRecord;
use std::sync::Arc;

/// Read-only view over the fonts the OS has registered.
#[derive(Clone)]
pub struct FontCatalog {
    platform: Arc<dyn FontPlatform>,
}

impl FontCatalog {
    pub fn new(platform: Arc<dyn FontPlatform>) -> Self {
        Self { platform }
    }

    /// List registered fonts, ordered by display name.
    ///
    /// An unreadable font registry is an `EnumerationError`, never an empty
    /// list; an empty result means the OS truly has no fonts registered.
    pub fn list_fonts(&self) -> Result<Vec<FontRecord>> {
        let mut fonts = self.platform.enumerate_fonts()?;
        fonts.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(fonts)
    }

    /// Look a font up by display name (case-insensitive, as Windows
    /// treats font names).
    pub fn find(&self, name: &str) -> Result<Option<FontRecord>> {
        Ok(self
            .platform
            .enumerate_fonts()?
            .into_iter()
            .find(|record| record.name.eq_ignore_ascii_case(name)))
    }

    /// Like `find`, but absence is an `UnknownFontError`.
    pub fn resolve(&self, name: &str) -> Result<FontRecord> {
        self.find(name)?
            .ok_or_else(|| FontError::UnknownFont(format!("'{}' is not installed", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::MemoryFontPlatform;

    fn catalog_with(fonts: &[(&str, &str)]) -> FontCatalog {
        let platform = MemoryFontPlatform::new();
        for (family, file) in fonts {
            platform.add_font(family, file);
        }
        FontCatalog::new(Arc::new(platform))
    }

    #[test]
    fn test_list_fonts_is_ordered() {
        let catalog = catalog_with(&[
            ("Verdana", "verdana.ttf"),
            ("arial", "arial.ttf"),
            ("Consolas", "consola.ttf"),
        ]);

        let names: Vec<String> = catalog
            .list_fonts()
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["arial", "Consolas", "Verdana"]);
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let catalog = catalog_with(&[("Consolas", "consola.ttf")]);
        let record = catalog.find("CONSOLAS").unwrap().unwrap();
        assert_eq!(record.name, "Consolas");
    }

    #[test]
    fn test_resolve_unknown_font() {
        let catalog = catalog_with(&[]);
        let result = catalog.resolve("Papyrus");
        assert!(matches!(result, Err(FontError::UnknownFont(_))));
    }

    #[test]
    fn test_enumeration_failure_propagates() {
        let platform = Arc::new(MemoryFontPlatform::new());
        platform.set_fail_enumeration(true);
        let catalog = FontCatalog::new(platform);

        let result = catalog.list_fonts();
        assert!(matches!(result, Err(FontError::Enumeration(_))));
    }
}
