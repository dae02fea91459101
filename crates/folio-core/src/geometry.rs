#![forbid(unsafe_code)]

//! Geometric primitives in CSS pixels.
//!
//! Viewport rectangles come from `getBoundingClientRect()`; offsets are
//! relative to the enrolled element's parent and map to inline `left`/`top`.

/// A point in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A viewport rectangle (origin at the top-left of the viewport).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Parent-relative position of an element, written as inline `left`/`top`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub left: f64,
    pub top: f64,
}

impl Offset {
    #[must_use]
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }

    /// Offset moved by `(dx, dy)`.
    #[must_use]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.left + dx, self.top + dy)
    }

    /// Inline style pair (`"42px"`, `"7px"`).
    #[must_use]
    pub fn to_inline(self) -> InlineOffset {
        InlineOffset {
            left: format_px(self.left),
            top: format_px(self.top),
        }
    }
}

/// Raw inline `left`/`top` style strings, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InlineOffset {
    pub left: String,
    pub top: String,
}

impl InlineOffset {
    #[must_use]
    pub fn new(left: impl Into<String>, top: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            top: top.into(),
        }
    }

    /// Numeric offset with the integer reading a browser `parseInt` gives;
    /// absent or unparsable components read as 0.
    #[must_use]
    pub fn to_offset(&self) -> Offset {
        Offset::new(
            parse_px(&self.left).unwrap_or(0.0),
            parse_px(&self.top).unwrap_or(0.0),
        )
    }
}

/// Clamp one axis so an element of `extent` stays inside `container`.
///
/// The valid range is `[0, container - extent]`. When the element is larger
/// than its container the range is empty and the result is 0.
#[inline]
#[must_use]
pub fn clamp_axis(candidate: f64, container: f64, extent: f64) -> f64 {
    let max = container - extent;
    let clamped = candidate.min(max).max(0.0);
    // Collapse -0.0 and NaN so they never reach the style sheet.
    if clamped > 0.0 { clamped } else { 0.0 }
}

/// Clamp both axes independently.
#[must_use]
pub fn clamp_offset(candidate: Offset, container: Size, element: Size) -> Offset {
    Offset::new(
        clamp_axis(candidate.left, container.width, element.width),
        clamp_axis(candidate.top, container.height, element.height),
    )
}

/// Format a pixel length the way JS number-to-string concatenation does for
/// ordinary values (`250` -> `"250px"`, `12.5` -> `"12.5px"`).
#[must_use]
pub fn format_px(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0px".to_owned();
    }
    format!("{value}px")
}

/// Integer part of a CSS length, following `parseInt` semantics: leading
/// whitespace and sign are accepted, parsing stops at the first non-digit.
#[must_use]
pub fn parse_px(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    let end = digits
        .as_bytes()
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<f64>().ok().map(|value| sign * value)
}
