//! GameView: maps a [`GameSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::engine::{CountdownStep, GameReport};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::format::{format_number, format_slot, slot_color, text_color};
use crate::presenter::Flash;
use crate::types::{SessionPhase, Slot, BOARD_SIDE, BONUS_SPAWN_PERIOD};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub port: u16,
    /// Remote commands applied so far
    pub commands: u64,
}

/// Everything drawn in one frame
#[derive(Debug, Clone, Copy)]
pub struct ViewModel<'a> {
    pub snapshot: &'a GameSnapshot,
    /// Slot under the keyboard cursor
    pub cursor: Option<usize>,
    pub best_score: u64,
    pub dark: bool,
    pub flash: Option<Flash>,
    pub countdown: Option<CountdownStep>,
    pub report: Option<&'a GameReport>,
    pub adapter: Option<AdapterStatusView>,
}

impl<'a> ViewModel<'a> {
    pub fn new(snapshot: &'a GameSnapshot) -> Self {
        Self {
            snapshot,
            cursor: None,
            best_score: 0,
            dark: false,
            flash: None,
            countdown: None,
            report: None,
            adapter: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

struct Theme {
    screen: CellStyle,
    frame: CellStyle,
    label: CellStyle,
    value: CellStyle,
    accent: CellStyle,
}

impl Theme {
    fn new(dark: bool) -> Self {
        let (bg, fg, board) = if dark {
            (Rgb::new(26, 26, 26), Rgb::new(225, 225, 225), Rgb::new(60, 60, 68))
        } else {
            (Rgb::new(250, 248, 239), Rgb::new(44, 62, 80), Rgb::new(187, 173, 160))
        };
        Self {
            screen: CellStyle::new(fg, bg),
            frame: CellStyle::new(board, bg),
            label: CellStyle::new(fg, bg).bold(),
            value: CellStyle::new(fg, bg),
            accent: CellStyle::new(Rgb::new(231, 76, 60), bg).bold(),
        }
    }
}

/// Terminal renderer for the merge board.
pub struct GameView {
    /// Tile width in terminal columns.
    cell_w: u16,
    /// Tile height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 8x3 keeps tiles roughly square and fits "1048k" with padding.
        Self {
            cell_w: 8,
            cell_h: 3,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(3),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(&self, view: &ViewModel<'_>, viewport: Viewport, fb: &mut FrameBuffer) {
        let theme = Theme::new(view.dark);
        fb.resize(viewport.width, viewport.height);
        fb.clear(theme.screen.cell(' '));

        let side = BOARD_SIDE as u16;
        let frame_w = side * self.cell_w + 2;
        let frame_h = side * self.cell_h + 2;
        let start_x = viewport.width.saturating_sub(frame_w + 20) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h + 2) / 2,
            AnchorY::Top => 0,
        };

        self.draw_border(fb, start_x, start_y, frame_w, frame_h, theme.frame);

        let snap = view.snapshot;
        for (index, &slot) in snap.slots.iter().enumerate() {
            self.draw_tile(fb, view, start_x, start_y, index, slot);
        }

        self.draw_side_panel(fb, view, &theme, viewport, start_x + frame_w + 2, start_y);
        self.draw_status_line(fb, view, &theme, start_x, start_y + frame_h, frame_w);

        let overlay = |fb: &mut FrameBuffer, lines: &[&str]| {
            self.draw_overlay(fb, start_x, start_y, frame_w, frame_h, lines);
        };
        if let Some(step) = view.countdown {
            let text = match step {
                CountdownStep::Count(n) => match n {
                    3 => "3",
                    2 => "2",
                    _ => "1",
                },
                CountdownStep::Go | CountdownStep::Start => "GO!",
            };
            overlay(fb, &[text]);
        } else {
            match snap.phase {
                SessionPhase::Idle => overlay(fb, &["TILE MERGE", "", "press N to start"]),
                SessionPhase::Paused => overlay(fb, &["PAUSED", "", "press P to resume"]),
                SessionPhase::Ended => self.draw_game_over(fb, view, start_x, start_y, frame_w, frame_h),
                SessionPhase::Running => {}
            }
        }

        if viewport.height > 0 {
            fb.put_str(
                0,
                viewport.height - 1,
                " arrows move  space select  p pause  r restart  n new  1-3 level  t theme  m bell  q quit",
                theme.value.dim(),
            );
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, view: &ViewModel<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(view, viewport, &mut fb);
        fb
    }

    /// Top-left corner of a tile on screen
    pub fn tile_origin(&self, start_x: u16, start_y: u16, index: usize) -> (u16, u16) {
        let col = (index % BOARD_SIDE) as u16;
        let row = (index / BOARD_SIDE) as u16;
        (
            start_x + 1 + col * self.cell_w,
            start_y + 1 + row * self.cell_h,
        )
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }
        fb.put_char(x, y, '╭', style);
        fb.put_char(x + w - 1, y, '╮', style);
        fb.put_char(x, y + h - 1, '╰', style);
        fb.put_char(x + w - 1, y + h - 1, '╯', style);
        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_tile(
        &self,
        fb: &mut FrameBuffer,
        view: &ViewModel<'_>,
        start_x: u16,
        start_y: u16,
        index: usize,
        slot: Slot,
    ) {
        let (px, py) = self.tile_origin(start_x, start_y, index);
        let mismatched = matches!(
            view.flash,
            Some(Flash::Mismatch { first, second }) if first == index || second == index
        );
        let bg = if mismatched {
            Rgb::new(120, 30, 30)
        } else {
            slot_color(slot, view.dark)
        };
        let fg = text_color(bg);
        let base = CellStyle::new(fg, bg);
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ' ', base);

        let selected = view.snapshot.selected == Some(index);
        let label = format_slot(slot);
        let label_y = py + self.cell_h / 2;
        if selected {
            let text = format!("[{label}]");
            fb.put_str_centered(px, label_y, self.cell_w, &text, base.bold());
        } else if slot.is_empty() {
            fb.put_str_centered(px, label_y, self.cell_w, "·", base.dim());
        } else {
            fb.put_str_centered(px, label_y, self.cell_w, &label, base.bold());
        }

        if view.cursor == Some(index) {
            let mark = base.bold();
            let right = px + self.cell_w - 1;
            let bottom = py + self.cell_h - 1;
            fb.put_char(px, py, '▛', mark);
            fb.put_char(right, py, '▜', mark);
            fb.put_char(px, bottom, '▙', mark);
            fb.put_char(right, bottom, '▟', mark);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        view: &ViewModel<'_>,
        theme: &Theme,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }
        let snap = view.snapshot;
        let mut y = start_y;
        let mut row = |fb: &mut FrameBuffer, label: &str, value: &str| {
            fb.put_str(panel_x, y, label, theme.label);
            fb.put_str(panel_x + 8, y, value, theme.value);
            y = y.saturating_add(1);
        };

        row(fb, "SCORE", &format_number(snap.score));
        row(fb, "BEST", &format_number(view.best_score.max(snap.score)));
        row(fb, "MAX", &format_number(snap.max_number));
        row(fb, "MATCHES", &snap.matches.to_string());
        row(fb, "COMBO", &format!("x{}", snap.combo.max(1)));
        row(fb, "STREAK", &snap.streak.to_string());
        row(
            fb,
            "BONUS",
            &format!("{}/{}", snap.bonus_progress, BONUS_SPAWN_PERIOD),
        );
        row(fb, "LEVEL", snap.difficulty.as_str());
        match view.adapter {
            Some(st) => row(fb, "AI", &format!(":{} {} cmds", st.port, st.commands)),
            None => row(fb, "AI", "off"),
        }
    }

    fn draw_status_line(
        &self,
        fb: &mut FrameBuffer,
        view: &ViewModel<'_>,
        theme: &Theme,
        x: u16,
        y: u16,
        w: u16,
    ) {
        let text = match view.flash {
            Some(Flash::Combo(n)) => format!("COMBO x{n}!"),
            Some(Flash::Spawned { bonus: true, .. }) => "BONUS TILE!".to_string(),
            Some(Flash::Mismatch { .. }) => "no match".to_string(),
            _ => return,
        };
        fb.put_str_centered(x, y, w, &text, theme.accent);
    }

    fn draw_game_over(
        &self,
        fb: &mut FrameBuffer,
        view: &ViewModel<'_>,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
    ) {
        let score = format!("score {}", format_number(view.snapshot.score));
        let mut lines: Vec<String> = vec!["GAME OVER".to_string(), score];
        if let Some(report) = view.report {
            if report.new_record {
                lines.push("NEW RECORD!".to_string());
            }
            for a in report.achievements.iter().take(3) {
                lines.push(format!("* {}", a.title()));
            }
        }
        lines.push(String::new());
        lines.push("press R or N".to_string());
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        self.draw_overlay(fb, start_x, start_y, frame_w, frame_h, &refs);
    }

    fn draw_overlay(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
        lines: &[&str],
    ) {
        let style = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(20, 20, 24)).bold();
        let inner_w = frame_w.saturating_sub(4);
        let h = lines.len() as u16 + 2;
        let top = start_y + frame_h.saturating_sub(h) / 2;
        fb.fill_rect(start_x + 2, top, inner_w, h, ' ', style);
        for (i, line) in lines.iter().enumerate() {
            fb.put_str_centered(start_x + 2, top + 1 + i as u16, inner_w, line, style);
        }
    }
}
