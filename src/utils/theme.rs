use colored::Colorize;

pub struct Theme {
    pub prompt: String,
    pub error_style: Box<dyn Fn(String) -> String>,
    pub notice_style: Box<dyn Fn(String) -> String>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            prompt: String::from("$ "),
            error_style: Box::new(|s| s),
            notice_style: Box::new(|s| s),
        }
    }
}

impl Theme {
    pub fn colored() -> Self {
        Theme {
            error_style: Box::new(|s| s.bright_red().to_string()),
            notice_style: Box::new(|s| s.bright_yellow().to_string()),
            ..Theme::default()
        }
    }
}

pub fn load_theme(color: bool) -> Theme {
    if color {
        Theme::colored()
    } else {
        Theme::default()
    }
}
