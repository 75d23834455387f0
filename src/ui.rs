//! HUD: score labels and the restart control

/// Text labels the HUD writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Score,
    HighScore,
}

/// Controls the HUD can show or hide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Restart,
}

/// Host-side widget access
pub trait UiPort {
    fn set_label(&mut self, label: Label, text: &str);
    fn set_control_visible(&mut self, control: Control, visible: bool);
}

/// Snapshot of what the HUD should display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HudView {
    pub score: u64,
    pub best: u64,
    pub restart_visible: bool,
}

/// Remembers what was last pushed so unchanged values are not re-sent
#[derive(Debug, Default)]
pub struct Hud {
    shown: Option<HudView>,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the parts of `view` that differ from the last sync
    pub fn sync(&mut self, view: HudView, port: &mut impl UiPort) {
        let previous = self.shown;
        if previous.map(|p| p.score) != Some(view.score) {
            port.set_label(Label::Score, &format!("Score: {}", view.score));
        }
        if previous.map(|p| p.best) != Some(view.best) {
            port.set_label(Label::HighScore, &format!("High Score: {}", view.best));
        }
        if previous.map(|p| p.restart_visible) != Some(view.restart_visible) {
            port.set_control_visible(Control::Restart, view.restart_visible);
        }
        self.shown = Some(view);
    }

    /// Forget the last pushed view; the next sync writes everything
    pub fn invalidate(&mut self) {
        self.shown = None;
    }
}

/// Port that writes HUD changes to the log
#[derive(Debug, Default)]
pub struct LogUi;

impl UiPort for LogUi {
    fn set_label(&mut self, label: Label, text: &str) {
        log::debug!("HUD {label:?}: {text}");
    }

    fn set_control_visible(&mut self, control: Control, visible: bool) {
        log::info!("HUD {control:?} {}", if visible { "shown" } else { "hidden" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Widgets {
        labels: Vec<(Label, String)>,
        controls: Vec<(Control, bool)>,
    }

    impl UiPort for Widgets {
        fn set_label(&mut self, label: Label, text: &str) {
            self.labels.push((label, text.to_string()));
        }

        fn set_control_visible(&mut self, control: Control, visible: bool) {
            self.controls.push((control, visible));
        }
    }

    #[test]
    fn test_first_sync_pushes_everything() {
        let mut hud = Hud::new();
        let mut ui = Widgets::default();
        hud.sync(
            HudView {
                score: 3,
                best: 40,
                restart_visible: false,
            },
            &mut ui,
        );
        assert_eq!(
            ui.labels,
            vec![
                (Label::Score, "Score: 3".to_string()),
                (Label::HighScore, "High Score: 40".to_string()),
            ]
        );
        assert_eq!(ui.controls, vec![(Control::Restart, false)]);
    }

    #[test]
    fn test_only_changes_are_pushed() {
        let mut hud = Hud::new();
        let mut ui = Widgets::default();
        let view = HudView {
            score: 3,
            best: 40,
            restart_visible: false,
        };
        hud.sync(view, &mut ui);
        ui = Widgets::default();

        hud.sync(view, &mut ui);
        assert!(ui.labels.is_empty() && ui.controls.is_empty());

        hud.sync(
            HudView {
                score: 4,
                ..view
            },
            &mut ui,
        );
        assert_eq!(ui.labels, vec![(Label::Score, "Score: 4".to_string())]);
        assert!(ui.controls.is_empty());

        hud.sync(
            HudView {
                score: 4,
                restart_visible: true,
                ..view
            },
            &mut ui,
        );
        assert_eq!(ui.controls, vec![(Control::Restart, true)]);
    }

    #[test]
    fn test_invalidate_forces_full_push() {
        let mut hud = Hud::new();
        let mut ui = Widgets::default();
        let view = HudView::default();
        hud.sync(view, &mut ui);
        hud.invalidate();
        hud.sync(view, &mut ui);
        assert_eq!(ui.labels.len(), 4);
        assert_eq!(ui.controls.len(), 2);
    }
}
