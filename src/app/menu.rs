//! Main menu actions and parsing.

/// Main menu choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Show registered feeds.
    ListFeeds,
    /// Aggregate and page through articles.
    Read,
    AddFeed,
    RemoveFeed,
    EditFeed,
    ToggleTranslation,
    Quit,
    /// Invalid or unknown input.
    Invalid(String),
}

impl MenuAction {
    /// Parse a menu action from user input.
    pub fn parse(input: &str) -> Self {
        let input = input.trim().to_uppercase();

        match input.as_str() {
            "1" | "L" => MenuAction::ListFeeds,
            "2" | "R" => MenuAction::Read,
            "3" | "A" => MenuAction::AddFeed,
            "4" | "D" => MenuAction::RemoveFeed,
            "5" | "E" => MenuAction::EditFeed,
            "6" | "T" => MenuAction::ToggleTranslation,
            "7" | "Q" => MenuAction::Quit,
            other => MenuAction::Invalid(other.to_string()),
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, MenuAction::Invalid(_))
    }

    /// Menu number for this action.
    pub fn key(&self) -> &'static str {
        match self {
            MenuAction::ListFeeds => "1",
            MenuAction::Read => "2",
            MenuAction::AddFeed => "3",
            MenuAction::RemoveFeed => "4",
            MenuAction::EditFeed => "5",
            MenuAction::ToggleTranslation => "6",
            MenuAction::Quit => "7",
            MenuAction::Invalid(_) => "",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            MenuAction::ListFeeds => "List feeds",
            MenuAction::Read => "Read articles",
            MenuAction::AddFeed => "Add feed",
            MenuAction::RemoveFeed => "Remove feed",
            MenuAction::EditFeed => "Edit feed",
            MenuAction::ToggleTranslation => "Toggle translation",
            MenuAction::Quit => "Quit",
            MenuAction::Invalid(_) => "",
        }
    }
}

const MENU: [MenuAction; 7] = [
    MenuAction::ListFeeds,
    MenuAction::Read,
    MenuAction::AddFeed,
    MenuAction::RemoveFeed,
    MenuAction::EditFeed,
    MenuAction::ToggleTranslation,
    MenuAction::Quit,
];

/// Render the main menu.
pub fn render_menu(translation_enabled: bool) -> String {
    let mut out = String::from("\n=== feedling ===\n");
    for action in &MENU {
        out.push_str(&format!("{}. {}", action.key(), action.label()));
        if *action == MenuAction::ToggleTranslation {
            out.push_str(&format!(" (now: {})", on_off(translation_enabled)));
        }
        out.push('\n');
    }
    out
}

pub(crate) fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
