use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, ReactionType};

/// Prefix shared by every music control id, used to route component interactions
pub const CONTROL_PREFIX: &str = "music_";

/// A button on the now-playing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Skip,
    Pause,
    Resume,
    Loop,
    Stop,
}

impl Control {
    /// Every control, in the order the buttons are laid out
    pub const ALL: [Control; 5] = [
        Control::Skip,
        Control::Pause,
        Control::Resume,
        Control::Loop,
        Control::Stop,
    ];

    pub fn custom_id(self) -> &'static str {
        match self {
            Control::Skip => "music_skip",
            Control::Pause => "music_pause",
            Control::Resume => "music_resume",
            Control::Loop => "music_loop",
            Control::Stop => "music_stop",
        }
    }

    pub fn from_custom_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|control| control.custom_id() == id)
    }

    fn label(self) -> &'static str {
        match self {
            Control::Skip => "Skip",
            Control::Pause => "Pause",
            Control::Resume => "Resume",
            Control::Loop => "Loop",
            Control::Stop => "Stop",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Control::Skip => "⏭️",
            Control::Pause => "⏸️",
            Control::Resume => "▶️",
            Control::Loop => "🔁",
            Control::Stop => "⏹️",
        }
    }

    fn style(self) -> ButtonStyle {
        match self {
            Control::Skip => ButtonStyle::Primary,
            Control::Pause | Control::Loop => ButtonStyle::Secondary,
            Control::Resume => ButtonStyle::Success,
            Control::Stop => ButtonStyle::Danger,
        }
    }
}

/// Creates a row of music control buttons
pub fn create_music_control_buttons() -> Vec<CreateActionRow> {
    let buttons = Control::ALL
        .into_iter()
        .map(|control| {
            CreateButton::new(control.custom_id())
                .emoji(ReactionType::Unicode(control.emoji().to_string()))
                .style(control.style())
                .label(control.label())
        })
        .collect();

    vec![CreateActionRow::Buttons(buttons)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("music_skip" => Some(Control::Skip))]
    #[test_case("music_pause" => Some(Control::Pause))]
    #[test_case("music_resume" => Some(Control::Resume))]
    #[test_case("music_loop" => Some(Control::Loop))]
    #[test_case("music_stop" => Some(Control::Stop))]
    #[test_case("skip" => None; "missing prefix")]
    #[test_case("music_queue_toggle" => None; "unknown control")]
    fn test_from_custom_id(id: &str) -> Option<Control> {
        Control::from_custom_id(id)
    }

    #[test]
    fn test_custom_ids_share_prefix() {
        for control in Control::ALL {
            assert!(control.custom_id().starts_with(CONTROL_PREFIX));
        }
    }

    /// Tests that one row holds all five buttons in layout order.
    #[test]
    fn test_control_buttons_layout() {
        let rows = create_music_control_buttons();
        assert_eq!(rows.len(), 1);

        let row = serde_json::to_value(&rows[0]).unwrap();
        let ids: Vec<&str> = row["components"]
            .as_array()
            .unwrap()
            .iter()
            .map(|button| button["custom_id"].as_str().unwrap())
            .collect();

        assert_eq!(
            ids,
            vec![
                "music_skip",
                "music_pause",
                "music_resume",
                "music_loop",
                "music_stop"
            ]
        );
    }
}
