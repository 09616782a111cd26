use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Attribute, Stylize};

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_styles() -> Styles {
    clap::builder::Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

pub mod colors {
    use crossterm::style::Color;

    pub const YELLOW: Color = Color::Rgb {
        r: 255,
        g: 203,
        b: 5,
    };
    pub const RED: Color = Color::Rgb {
        r: 238,
        g: 21,
        b: 21,
    };
    pub const BLUE: Color = Color::Rgb {
        r: 59,
        g: 76,
        b: 202,
    };
    pub const GREEN: Color = Color::Rgb {
        r: 0,
        g: 200,
        b: 120,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
    pub const WHITE: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}

pub mod box_chars {
    pub const ROUND_TOP_LEFT: &str = "╭";
    pub const ROUND_TOP_RIGHT: &str = "╮";
    pub const ROUND_BOTTOM_LEFT: &str = "╰";
    pub const ROUND_BOTTOM_RIGHT: &str = "╯";
    pub const SINGLE_HORIZONTAL: &str = "─";
    pub const SINGLE_VERTICAL: &str = "│";
    pub const T_LEFT: &str = "├";
    pub const T_RIGHT: &str = "┤";
    pub const T_TOP: &str = "┬";
    pub const T_BOTTOM: &str = "┴";
    pub const CROSS: &str = "┼";
    pub const ARROW_RIGHT: &str = "▶";
    pub const BULLET: &str = "●";
    pub const BULLET_EMPTY: &str = "○";
    pub const CHECK: &str = "✓";
    pub const CROSS_MARK: &str = "✗";
}

/// Terminal columns taken by `s`, counting one per char.
fn width(s: &str) -> usize {
    s.chars().count()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Status Indicators
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_success(message: &str) {
    println!(
        " {} {}",
        box_chars::CHECK.to_string().with(colors::GREEN).bold(),
        message.with(colors::GREEN)
    );
}

pub fn print_error(message: &str) {
    println!(
        " {} {}",
        box_chars::CROSS_MARK.to_string().with(colors::RED).bold(),
        message.with(colors::RED)
    );
}

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        box_chars::BULLET.with(colors::RED),
        format!("{}:", key).with(colors::DIM),
        value.with(colors::WHITE)
    );
}

pub fn print_list_item(item: &str) {
    println!(
        "  {}  {}",
        box_chars::ARROW_RIGHT.with(colors::YELLOW),
        item.with(colors::WHITE)
    );
}

pub fn print_empty_list(message: &str) {
    println!(
        "  {} {}",
        box_chars::BULLET_EMPTY.with(colors::DIM),
        message.with(colors::DIM).attribute(Attribute::Italic)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Table Display
// ═══════════════════════════════════════════════════════════════════════════════

pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl TableBuilder {
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
        TableBuilder {
            headers: headers.into_iter().map(String::from).collect(),
            rows: Vec::new(),
            col_widths,
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, cell) in row.iter().enumerate() {
            if i < self.col_widths.len() {
                self.col_widths[i] = self.col_widths[i].max(width(cell));
            }
        }
        self.rows.push(row);
    }

    fn print_border(&self, left: &str, junction: &str, right: &str) {
        print!("{}", left.with(colors::BLUE));
        for (i, w) in self.col_widths.iter().enumerate() {
            print!(
                "{}",
                box_chars::SINGLE_HORIZONTAL.repeat(w + 2).with(colors::BLUE)
            );
            if i < self.col_widths.len() - 1 {
                print!("{}", junction.with(colors::BLUE));
            }
        }
        println!("{}", right.with(colors::BLUE));
    }

    fn print_cells(&self, cells: &[String], header: bool) {
        print!("{}", box_chars::SINGLE_VERTICAL.with(colors::BLUE));
        for (i, cell) in cells.iter().enumerate() {
            let padding = self.col_widths.get(i).unwrap_or(&0).saturating_sub(width(cell));
            if header {
                print!(" {}{} ", cell.clone().with(colors::YELLOW).bold(), " ".repeat(padding));
            } else {
                print!(" {}{} ", cell.clone().with(colors::WHITE), " ".repeat(padding));
            }
            print!("{}", box_chars::SINGLE_VERTICAL.with(colors::BLUE));
        }
        println!();
    }

    pub fn print(&self) {
        self.print_border(box_chars::ROUND_TOP_LEFT, box_chars::T_TOP, box_chars::ROUND_TOP_RIGHT);
        self.print_cells(&self.headers, true);
        self.print_border(box_chars::T_LEFT, box_chars::CROSS, box_chars::T_RIGHT);
        for row in &self.rows {
            self.print_cells(row, false);
        }
        self.print_border(
            box_chars::ROUND_BOTTOM_LEFT,
            box_chars::T_BOTTOM,
            box_chars::ROUND_BOTTOM_RIGHT,
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Prompt, Welcome, Goodbye
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_prompt() -> String {
    format!(
        "{}{} ",
        "◓".with(colors::RED).bold(),
        "❯".with(colors::YELLOW).bold(),
    )
}

pub fn print_command_echo(command: &str) {
    println!("{}  {}", get_prompt(), command.with(colors::GREEN).bold());
}

pub fn print_welcome(db_path: &str) {
    println!();
    println!(
        "  {}",
        "POKÉCATCH  ·  USER MANAGEMENT".with(colors::YELLOW).bold()
    );
    print_key_value("Database", db_path);
    print_key_value("Build", env!("GIT_HASH"));
    println!(
        "  {}",
        "Type 'help' for available commands".with(colors::DIM)
    );
    println!();
}

pub fn print_goodbye() {
    println!();
    println!("  {}", "Goodbye!".with(colors::BLUE).bold());
    println!();
}
