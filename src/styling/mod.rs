use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleColor {
    pub fill: &'static str,
    pub border: &'static str,
}

pub const MODULE_PALETTE: [ModuleColor; 8] = [
    ModuleColor {
        fill: "#1a1f2b",
        border: "rgba(59, 130, 246, 0.5)",
    },
    ModuleColor {
        fill: "#1a1a24",
        border: "rgba(168, 85, 247, 0.5)",
    },
    ModuleColor {
        fill: "#1a1f1a",
        border: "rgba(16, 185, 129, 0.5)",
    },
    ModuleColor {
        fill: "#1f1c1a",
        border: "rgba(249, 115, 22, 0.5)",
    },
    ModuleColor {
        fill: "#1f1a1a",
        border: "rgba(239, 68, 68, 0.5)",
    },
    ModuleColor {
        fill: "#1a1f1f",
        border: "rgba(6, 182, 212, 0.5)",
    },
    ModuleColor {
        fill: "#1f1f1a",
        border: "rgba(234, 179, 8, 0.5)",
    },
    ModuleColor {
        fill: "#1f1a1f",
        border: "rgba(236, 72, 153, 0.5)",
    },
];

/// Module name to palette entry, assigned in first-sight order.
///
/// The counter only moves forward: releasing a module frees its cache entry
/// but not its palette slot, so a module that comes back may get a different
/// color.
#[derive(Debug, Clone, Default)]
pub struct ColorRegistry {
    assigned: HashMap<String, ModuleColor>,
    counter: usize,
}

impl ColorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_for(&mut self, module: &str) -> ModuleColor {
        if let Some(color) = self.assigned.get(module) {
            return *color;
        }
        let color = MODULE_PALETTE[self.counter % MODULE_PALETTE.len()];
        self.counter += 1;
        self.assigned.insert(module.to_string(), color);
        color
    }

    pub fn peek(&self, module: &str) -> Option<ModuleColor> {
        self.assigned.get(module).copied()
    }

    pub fn release(&mut self, module: &str) -> bool {
        self.assigned.remove(module).is_some()
    }

    pub fn reset(&mut self) {
        self.assigned.clear();
        self.counter = 0;
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeColor {
    pub color: &'static str,
    pub highlight: &'static str,
    pub hover: &'static str,
}

pub const EDGE_NORMAL: EdgeColor = EdgeColor {
    color: "rgba(255, 255, 255, 0.15)",
    highlight: "rgba(255, 255, 255, 0.25)",
    hover: "rgba(255, 255, 255, 0.25)",
};

pub const EDGE_ACTIVE: EdgeColor = EdgeColor {
    color: "rgba(33, 150, 243, 0.6)",
    highlight: "rgba(33, 150, 243, 0.8)",
    hover: "rgba(33, 150, 243, 0.8)",
};

/// How an edge is drawn. `Running` marks the edge feeding a task in flight,
/// `Done` an edge that fed a finished task or is free to feed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    #[default]
    Neutral,
    Running,
    Done,
}

impl EdgeStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Running => "running",
            Self::Done => "done",
        }
    }

    pub fn color(self) -> EdgeColor {
        match self {
            Self::Neutral => EDGE_NORMAL,
            Self::Running | Self::Done => EDGE_ACTIVE,
        }
    }

    pub fn width(self) -> u8 {
        match self {
            Self::Running => 3,
            Self::Neutral | Self::Done => 2,
        }
    }

    pub fn dashes(self) -> Option<[u8; 2]> {
        match self {
            Self::Running => Some([2, 2]),
            Self::Neutral | Self::Done => None,
        }
    }

    pub fn is_active(self) -> bool {
        !matches!(self, Self::Neutral)
    }
}
