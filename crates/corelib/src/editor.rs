//! Headless editor state: the loaded model reference, the append-only hotspot
//! list and the pending label buffer, with one transition per user action.
//! The UI layer is a projection of this state; nothing here touches the GPU.

use std::mem;
use std::path::{Path, PathBuf};

use glam::Vec3;
use thiserror::Error;

/// Why a placement request was rejected. Rejections are silent at the UI;
/// callers log them at debug level at most.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PlaceError {
    #[error("pending label is empty")]
    EmptyLabel,
    #[error("no model is loaded")]
    NoModel,
}

/// Opaque handle to the loaded model: the path the user picked.
/// Replaced wholesale on every load, never explicitly released.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelRef {
    path: PathBuf,
}

impl ModelRef {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A labeled marker anchored to a fixed point on the model.
/// Immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct Hotspot {
    pub position: Vec3,
    pub label: String,
}

/// All mutable state of the editor view.
#[derive(Debug, Default)]
pub struct EditorState {
    model: Option<ModelRef>,
    hotspots: Vec<Hotspot>,
    /// Label for the next hotspot; bound directly to the text field and
    /// replaced verbatim on every keystroke.
    pub pending_label: String,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the model reference. Existing hotspots are kept.
    pub fn load_model(&mut self, path: impl Into<PathBuf>) {
        self.model = Some(ModelRef { path: path.into() });
    }

    pub fn model(&self) -> Option<&ModelRef> {
        self.model.as_ref()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Hotspots in insertion order.
    pub fn hotspots(&self) -> &[Hotspot] {
        &self.hotspots
    }

    /// Place a hotspot at a clicked surface point.
    ///
    /// Only the label is checked (not trimmed): the click path is unreachable
    /// without a loaded mesh, so model presence is not re-checked here.
    /// On success the pending label moves into the hotspot and the buffer is
    /// left empty.
    pub fn add_hotspot_at(&mut self, point: Vec3) -> Result<(), PlaceError> {
        if self.pending_label.is_empty() {
            return Err(PlaceError::EmptyLabel);
        }
        let label = mem::take(&mut self.pending_label);
        self.hotspots.push(Hotspot {
            position: point,
            label,
        });
        Ok(())
    }

    /// Place a hotspot via the explicit submit control.
    ///
    /// Requires a non-blank label and a loaded model. The hotspot lands at the
    /// origin, not at any clicked point, and the label is stored untrimmed.
    pub fn submit_label(&mut self) -> Result<(), PlaceError> {
        if self.pending_label.trim().is_empty() {
            return Err(PlaceError::EmptyLabel);
        }
        if self.model.is_none() {
            return Err(PlaceError::NoModel);
        }
        let label = mem::take(&mut self.pending_label);
        self.hotspots.push(Hotspot {
            position: Vec3::ZERO,
            label,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;

    #[test]
    fn clicks_append_one_hotspot_each_in_call_order() {
        let mut ed = EditorState::new();
        ed.load_model("model.obj");

        ed.pending_label = "Door".into();
        ed.add_hotspot_at(vec3(1.0, 2.0, 3.0)).unwrap();
        ed.pending_label = "Window".into();
        ed.add_hotspot_at(vec3(0.5, 1.0, -2.0)).unwrap();

        assert_eq!(ed.hotspots().len(), 2);
        assert_eq!(ed.hotspots()[0].label, "Door");
        assert_eq!(ed.hotspots()[0].position, vec3(1.0, 2.0, 3.0));
        assert_eq!(ed.hotspots()[1].label, "Window");
        assert_eq!(ed.hotspots()[1].position, vec3(0.5, 1.0, -2.0));
    }

    #[test]
    fn click_with_empty_label_is_rejected() {
        let mut ed = EditorState::new();
        ed.load_model("model.obj");
        let err = ed.add_hotspot_at(vec3(1.0, 0.0, 0.0)).unwrap_err();
        assert_eq!(err, PlaceError::EmptyLabel);
        assert!(ed.hotspots().is_empty());
    }

    #[test]
    fn click_accepts_whitespace_only_label() {
        // The click path checks emptiness only; blanks pass through verbatim.
        let mut ed = EditorState::new();
        ed.load_model("model.obj");
        ed.pending_label = "  ".into();
        ed.add_hotspot_at(Vec3::ONE).unwrap();
        assert_eq!(ed.hotspots()[0].label, "  ");
        assert!(ed.pending_label.is_empty());
    }

    #[test]
    fn submit_without_model_is_rejected() {
        let mut ed = EditorState::new();
        ed.pending_label = "Door".into();
        assert_eq!(ed.submit_label().unwrap_err(), PlaceError::NoModel);
        assert!(ed.hotspots().is_empty());
        assert_eq!(ed.pending_label, "Door");
    }

    #[test]
    fn submit_with_blank_label_is_rejected() {
        let mut ed = EditorState::new();
        ed.load_model("model.obj");
        ed.pending_label = "  ".into();
        assert_eq!(ed.submit_label().unwrap_err(), PlaceError::EmptyLabel);
        assert!(ed.hotspots().is_empty());
    }

    #[test]
    fn submit_places_at_origin_and_clears_label() {
        let mut ed = EditorState::new();
        ed.load_model("model.obj");
        ed.pending_label = "Entrance".into();
        ed.submit_label().unwrap();

        assert_eq!(ed.hotspots().len(), 1);
        assert_eq!(ed.hotspots()[0].position, Vec3::ZERO);
        assert_eq!(ed.hotspots()[0].label, "Entrance");
        assert!(ed.pending_label.is_empty());
    }

    #[test]
    fn submit_stores_label_untrimmed() {
        let mut ed = EditorState::new();
        ed.load_model("model.obj");
        ed.pending_label = " Entrance ".into();
        ed.submit_label().unwrap();
        assert_eq!(ed.hotspots()[0].label, " Entrance ");
    }

    #[test]
    fn reload_replaces_model_and_keeps_hotspots() {
        let mut ed = EditorState::new();
        ed.load_model("first.obj");
        ed.pending_label = "Roof".into();
        ed.add_hotspot_at(Vec3::Y).unwrap();

        ed.load_model("second.obj");
        assert_eq!(ed.model().unwrap().path(), Path::new("second.obj"));
        assert_eq!(ed.hotspots().len(), 1);
    }

    #[test]
    fn duplicate_positions_and_labels_are_allowed() {
        let mut ed = EditorState::new();
        ed.load_model("model.obj");
        for _ in 0..2 {
            ed.pending_label = "Same".into();
            ed.add_hotspot_at(Vec3::ZERO).unwrap();
        }
        assert_eq!(ed.hotspots().len(), 2);
        assert_eq!(ed.hotspots()[0], ed.hotspots()[1]);
    }

    #[test]
    fn rejected_submit_leaves_buffer_untouched() {
        let mut ed = EditorState::new();
        ed.pending_label = "Keep me".into();
        let _ = ed.submit_label();
        assert_eq!(ed.pending_label, "Keep me");
    }

    #[test]
    fn model_display_name_uses_file_name() {
        let mut ed = EditorState::new();
        ed.load_model("/tmp/scenes/house.obj");
        assert_eq!(ed.model().unwrap().display_name(), "house.obj");
    }
}
