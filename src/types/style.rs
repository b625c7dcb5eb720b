use serde::{Deserialize, Serialize};

/// Horizontal alignment within a cell.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum HAlign {
    General,
    Left,
    Center,
    Right,
    Justify,
}

impl HAlign {
    /// Attribute value used by `<alignment horizontal="..">`.
    #[must_use]
    pub fn as_xml(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }

    #[must_use]
    pub fn from_xml(value: &str) -> Option<Self> {
        match value {
            "general" => Some(Self::General),
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum VAlign {
    Top,
    Center, // Note: Excel uses "center" not "middle"
    Bottom,
    Justify,
}

impl VAlign {
    #[must_use]
    pub fn as_xml(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
            Self::Justify => "justify",
        }
    }

    #[must_use]
    pub fn from_xml(value: &str) -> Option<Self> {
        match value {
            "top" => Some(Self::Top),
            "center" => Some(Self::Center),
            "bottom" => Some(Self::Bottom),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// Typed cell formatting.
///
/// A bold style is written with the header font (Calibri 12, black); every
/// other style uses the workbook's default Calibri 11.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    pub bold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<HAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VAlign>,
    pub wrap_text: bool,
}

impl CellStyle {
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    #[must_use]
    pub fn horizontal(mut self, align: HAlign) -> Self {
        self.horizontal = Some(align);
        self
    }

    #[must_use]
    pub fn vertical(mut self, align: VAlign) -> Self {
        self.vertical = Some(align);
        self
    }

    #[must_use]
    pub fn wrap_text(mut self) -> Self {
        self.wrap_text = true;
        self
    }

    /// Layer `self` over `base`: set fields win, unset fields fall back.
    #[must_use]
    pub fn over(self, base: Self) -> Self {
        Self {
            bold: self.bold || base.bold,
            horizontal: self.horizontal.or(base.horizontal),
            vertical: self.vertical.or(base.vertical),
            wrap_text: self.wrap_text || base.wrap_text,
        }
    }

    /// Whether the style needs an `<alignment>` element.
    #[must_use]
    pub fn has_alignment(&self) -> bool {
        self.horizontal.is_some() || self.vertical.is_some() || self.wrap_text
    }
}
