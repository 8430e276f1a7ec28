/// Pure position information in source code files (TS/TSX/JS/JSX).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    pub file_path: String,
    pub line: usize,
    pub col: usize,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            col,
        }
    }
}

/// Position with context information in source code files.
///
/// Carries the source line so the reporter can print the offending code
/// without re-reading the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub location: SourceLocation,
    /// The source code line content for display.
    pub source_line: String,
}

impl SourceContext {
    pub fn new(location: SourceLocation, source_line: impl Into<String>) -> Self {
        Self {
            location,
            source_line: source_line.into(),
        }
    }

    // Convenience accessors
    pub fn file_path(&self) -> &str {
        &self.location.file_path
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn col(&self) -> usize {
        self.location.col
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{SourceContext, SourceLocation};

    #[test]
    fn test_source_location_new() {
        let loc = SourceLocation::new("./src/app.ts", 10, 5);
        assert_eq!(loc.file_path, "./src/app.ts");
        assert_eq!(loc.line, 10);
        assert_eq!(loc.col, 5);
    }

    #[test]
    fn test_source_context_new() {
        let loc = SourceLocation::new("./src/app.ts", 10, 5);
        let ctx = SourceContext::new(loc, "const x = user.getName();");
        assert_eq!(ctx.file_path(), "./src/app.ts");
        assert_eq!(ctx.line(), 10);
        assert_eq!(ctx.col(), 5);
        assert_eq!(ctx.source_line, "const x = user.getName();");
    }

    #[test]
    fn test_locations_order_by_file_then_line() {
        let a = SourceLocation::new("a.ts", 9, 1);
        let b = SourceLocation::new("a.ts", 10, 1);
        let c = SourceLocation::new("b.ts", 1, 1);
        assert!(a < b);
        assert!(b < c);
    }
}
