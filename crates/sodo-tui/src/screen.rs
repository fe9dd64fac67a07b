//! Top-level screens, navigable by number keys.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Map,
    Inventory,
    Report,
}

impl ScreenId {
    /// Tab-bar order.
    pub const ALL: [ScreenId; 3] = [Self::Map, Self::Inventory, Self::Report];

    pub fn number(self) -> u8 {
        match self {
            Self::Map => 1,
            Self::Inventory => 2,
            Self::Report => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous screen in tab order (wraps around).
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Map => "Map",
            Self::Inventory => "Inventory",
            Self::Report => "Report",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_order_wraps() {
        assert_eq!(ScreenId::Report.next(), ScreenId::Map);
        assert_eq!(ScreenId::Map.prev(), ScreenId::Report);
        assert_eq!(ScreenId::from_number(2), Some(ScreenId::Inventory));
        assert_eq!(ScreenId::from_number(9), None);
    }
}
