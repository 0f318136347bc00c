//! Pad abstraction for element inputs and outputs.
//!
//! Pads represent the connection points of elements. Each element can have
//! multiple input and output pads; request pads are created on demand from
//! a template whose name carries a `%d` (or `%u`) placeholder.

use crate::format::Caps;
use std::sync::Arc;

/// Direction of a pad (input or output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadDirection {
    /// An input pad (receives buffers from upstream).
    Input,
    /// An output pad (sends buffers downstream).
    Output,
}

/// Whether a pad is always present or created dynamically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadPresence {
    /// Pad is always present on the element.
    Always,
    /// Pad is created on demand by the element itself.
    Sometimes,
    /// Pad is created when requested.
    Request,
}

/// Template for creating pads.
///
/// Pad templates define the characteristics of pads that an element can have.
#[derive(Debug, Clone, PartialEq)]
pub struct PadTemplate {
    /// Name pattern for this pad (e.g., "primary-in", "aux-in-%d").
    pub name: String,
    /// Direction of this pad.
    pub direction: PadDirection,
    /// Whether this pad is always present or created on demand.
    pub presence: PadPresence,
    /// Content this pad accepts or produces.
    pub caps: Caps,
}

impl PadTemplate {
    /// Create a new pad template.
    pub fn new(
        name: impl Into<String>,
        direction: PadDirection,
        presence: PadPresence,
        caps: Caps,
    ) -> Self {
        Self {
            name: name.into(),
            direction,
            presence,
            caps,
        }
    }

    /// Create a template for an always-present input pad accepting anything.
    pub fn input(name: impl Into<String>) -> Self {
        Self::new(name, PadDirection::Input, PadPresence::Always, Caps::any())
    }

    /// Create a template for an always-present output pad producing anything.
    pub fn output(name: impl Into<String>) -> Self {
        Self::new(name, PadDirection::Output, PadPresence::Always, Caps::any())
    }

    /// Create a template for input pads created on request.
    pub fn request_input(name: impl Into<String>, caps: Caps) -> Self {
        Self::new(name, PadDirection::Input, PadPresence::Request, caps)
    }

    /// Expand the name pattern for the given index.
    ///
    /// Names without a placeholder are returned unchanged.
    pub fn instance_name(&self, index: u32) -> String {
        let index = index.to_string();
        if self.name.contains("%d") {
            self.name.replacen("%d", &index, 1)
        } else {
            self.name.replacen("%u", &index, 1)
        }
    }
}

/// A pad instance on an element.
///
/// Pads are the actual connection points used at runtime. They are created
/// from pad templates when an element is instantiated or a pad is requested.
#[derive(Debug, Clone)]
pub struct Pad {
    /// Unique name of this pad within the element.
    name: String,
    /// Direction of this pad.
    direction: PadDirection,
    /// The template this pad was created from.
    template: Arc<PadTemplate>,
}

impl Pad {
    /// Create a pad from a template.
    pub fn from_template(template: Arc<PadTemplate>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: template.direction,
            template,
        }
    }

    /// Get the pad's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the pad's direction.
    pub fn direction(&self) -> PadDirection {
        self.direction
    }

    /// Check if this is an input pad.
    pub fn is_input(&self) -> bool {
        self.direction == PadDirection::Input
    }

    /// Check if this is an output pad.
    pub fn is_output(&self) -> bool {
        self.direction == PadDirection::Output
    }

    /// Get the template this pad was created from.
    pub fn template(&self) -> &Arc<PadTemplate> {
        &self.template
    }

    /// Caps allowed on this pad.
    pub fn template_caps(&self) -> &Caps {
        &self.template.caps
    }
}
