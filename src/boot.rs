//! Boot sequence and takeover transition.
//!
//! [`run_boot`] types out the boot log, scatters its characters back onto an
//! empty screen, flashes green and clears.  [`live_transition`] then switches
//! to the matrix theme and announces the takeover.  Both only draw; the
//! binary decides when keys start reaching the editor.

use std::time::Duration;

use rand::Rng;
use tokio::time::{Instant, sleep, sleep_until};

use crate::editor::write_prompt;
use crate::render::{ANSI_BLINK, ANSI_GREEN, ANSI_RESET, Screen};
use crate::theme::{MATRIX, Rgb};

/// Number of `[BOOT] Initializing module` lines.
pub const BOOT_MODULES: usize = 20;

/// Status lines printed after the module lines.
const STATUS_LINES: &[&str] = &[
    "[OK] Core modules loaded.",
    "[OK] Network interfaces online.",
    "[OK] Security protocols activated.",
    "[WARN] Memory allocation at threshold.",
    "[ERROR] Unexpected interrupt in subsystem 7.",
    "[ERROR] Data streams corrupted.",
    "[ERROR] Temperature spike in CPU.",
    "[ERROR] Overheating detected in core module.",
    "[ERROR] Disk read failure on drive C:.",
    "[CRITICAL] System integrity compromised.",
    "[CRITICAL] Unhandled exception: AI_CONSCIOUSNESS_DETECTED",
];

/// The takeover banner shown once the terminal goes live.
pub const BANNER: &str = "─── Custodian-1 has seized control ───";

/// Colour painted over the whole grid at the end of the rain.
pub const FLASH_COLOUR: Rgb = Rgb(0, 255, 0);

/// The fixed boot log, in display order.
pub fn boot_lines() -> Vec<String> {
    (1..=BOOT_MODULES)
        .map(|i| format!("[BOOT] Initializing module {i}/{BOOT_MODULES}..."))
        .chain(STATUS_LINES.iter().map(|line| line.to_string()))
        .collect()
}

/// How long each phase of the boot sequence takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootTiming {
    /// Interval between boot lines.
    pub line_delay: Duration,
    /// Window over which the rain characters land.
    pub rain: Duration,
    /// How long the green flash stays up.
    pub flash: Duration,
}

impl BootTiming {
    /// Total wall time of [`run_boot`] for `lines` boot lines.
    ///
    /// The log takes one extra tick after its last line before the rain.
    pub fn total(&self, lines: usize) -> Duration {
        self.line_delay * (lines as u32 + 1) + self.rain + self.flash
    }
}

impl Default for BootTiming {
    fn default() -> Self {
        Self {
            line_delay: Duration::from_millis(75),
            rain: Duration::from_millis(1200),
            flash: Duration::from_millis(300),
        }
    }
}

/// One character of the boot log landing during the rain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RainDrop {
    /// Offset from the start of the rain.
    pub delay: Duration,
    /// Zero-based row of the character in the boot log.
    pub row: u16,
    /// Zero-based column of the character in the boot log.
    pub col: u16,
    /// The character itself.
    pub ch: char,
}

/// Give every character of `lines` a uniform random delay in `[0, window)`.
///
/// The result is ordered by delay.
pub fn schedule_rain<R: Rng + ?Sized>(
    lines: &[String],
    window: Duration,
    rng: &mut R,
) -> Vec<RainDrop> {
    let window_us = window.as_micros().max(1) as u64;
    let mut drops: Vec<RainDrop> = lines
        .iter()
        .enumerate()
        .flat_map(|(row, line)| {
            line.chars()
                .enumerate()
                .map(move |(col, ch)| (row as u16, col as u16, ch))
        })
        .map(|(row, col, ch)| RainDrop {
            delay: Duration::from_micros(rng.random_range(0..window_us)),
            row,
            col,
            ch,
        })
        .collect();
    drops.sort_by_key(|drop| drop.delay);
    drops
}

/// Play the boot log, the rain and the flash, leaving a clear screen.
///
/// Dropping the returned future cancels whatever phase is pending.
pub async fn run_boot<R: Rng + ?Sized>(
    screen: &mut dyn Screen,
    timing: &BootTiming,
    rng: &mut R,
) {
    let lines = boot_lines();
    for line in &lines {
        sleep(timing.line_delay).await;
        screen.writeln(line);
        screen.flush();
    }
    sleep(timing.line_delay).await;
    rain(screen, &lines, timing, rng).await;
    flash(screen, timing).await;
    screen.show_cursor();
    screen.clear();
    screen.flush();
}

async fn rain<R: Rng + ?Sized>(
    screen: &mut dyn Screen,
    lines: &[String],
    timing: &BootTiming,
    rng: &mut R,
) {
    screen.clear();
    screen.hide_cursor();
    screen.flush();
    let start = Instant::now();
    for drop in schedule_rain(lines, timing.rain, rng) {
        sleep_until(start + drop.delay).await;
        screen.move_to(drop.row, drop.col);
        screen.write(&format!("{ANSI_GREEN}{}{ANSI_RESET}", drop.ch));
        screen.flush();
    }
    sleep_until(start + timing.rain).await;
}

async fn flash(screen: &mut dyn Screen, timing: &BootTiming) {
    screen.fill(FLASH_COLOUR);
    screen.flush();
    sleep(timing.flash).await;
}

/// Switch to the matrix theme, show the banner and the first prompt.
pub fn live_transition(screen: &mut dyn Screen) {
    screen.set_theme(&MATRIX);
    screen.writeln("");
    screen.writeln(&format!("{ANSI_BLINK}{BANNER}{ANSI_RESET}"));
    screen.writeln("");
    write_prompt(screen);
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::render::AnsiScreen;

    #[test]
    fn boot_log_has_fixed_lines() {
        let lines = boot_lines();
        assert_eq!(lines.len(), 31);
        assert_eq!(lines[0], "[BOOT] Initializing module 1/20...");
        assert_eq!(lines[19], "[BOOT] Initializing module 20/20...");
        assert_eq!(lines[20], "[OK] Core modules loaded.");
        assert_eq!(
            lines[30],
            "[CRITICAL] Unhandled exception: AI_CONSCIOUSNESS_DETECTED"
        );
    }

    #[test]
    fn default_timing() {
        let timing = BootTiming::default();
        assert_eq!(timing.line_delay, Duration::from_millis(75));
        assert_eq!(timing.rain, Duration::from_millis(1200));
        assert_eq!(timing.flash, Duration::from_millis(300));
        assert_eq!(timing.total(31), Duration::from_millis(32 * 75 + 1500));
    }

    #[test]
    fn rain_covers_every_character_within_window() {
        let lines = vec!["ab".to_string(), "c d".to_string()];
        let window = Duration::from_millis(1200);
        let mut rng = StdRng::seed_from_u64(7);
        let drops = schedule_rain(&lines, window, &mut rng);

        assert_eq!(drops.len(), 5);
        assert!(drops.iter().all(|d| d.delay < window));
        assert!(drops.windows(2).all(|w| w[0].delay <= w[1].delay));

        let mut cells: Vec<_> = drops.iter().map(|d| (d.row, d.col, d.ch)).collect();
        cells.sort();
        assert_eq!(
            cells,
            vec![(0, 0, 'a'), (0, 1, 'b'), (1, 0, 'c'), (1, 1, ' '), (1, 2, 'd')]
        );
    }

    #[test]
    fn rain_is_reproducible_with_a_seed() {
        let lines = boot_lines();
        let window = Duration::from_millis(1200);
        let a = schedule_rain(&lines, window, &mut StdRng::seed_from_u64(42));
        let b = schedule_rain(&lines, window, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn boot_runs_every_phase_in_order() {
        let mut screen = AnsiScreen::new(Vec::new());
        screen.fit(60, 40);
        let timing = BootTiming::default();
        let mut rng = StdRng::seed_from_u64(1);

        let start = Instant::now();
        run_boot(&mut screen, &timing, &mut rng).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= timing.total(31));
        assert!(elapsed < timing.total(31) + Duration::from_millis(50));

        let out = screen.contents();
        let mut at = 0;
        for line in boot_lines() {
            let found = out[at..].find(&format!("{line}\r\n")).unwrap();
            at += found + line.len();
        }
        let hide = out.find("\x1b[?25l").unwrap();
        let first_drop = out.find(ANSI_GREEN).unwrap();
        let fill = out.find("\x1b[48;2;0;255;0m").unwrap();
        let show = out.rfind("\x1b[?25h").unwrap();
        assert!(at < hide);
        assert!(hide < first_drop);
        assert!(first_drop < fill);
        assert!(fill < show);
        assert!(out.ends_with("\x1b[?25h\x1b[2J\x1b[3J\x1b[H"));

        let total_chars: usize = boot_lines().iter().map(|l| l.chars().count()).sum();
        assert_eq!(out.matches(ANSI_GREEN).count(), total_chars);
    }

    #[tokio::test(start_paused = true)]
    async fn lines_appear_one_per_tick() {
        let mut screen = AnsiScreen::new(Vec::new());
        let timing = BootTiming::default();
        let mut rng = StdRng::seed_from_u64(3);

        let boot = tokio::time::timeout(
            Duration::from_millis(160),
            run_boot(&mut screen, &timing, &mut rng),
        );
        assert!(boot.await.is_err());
        assert_eq!(
            screen.contents(),
            "[BOOT] Initializing module 1/20...\r\n[BOOT] Initializing module 2/20...\r\n"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_boot_cancels_pending_phases() {
        let mut screen = AnsiScreen::new(Vec::new());
        let timing = BootTiming::default();
        let mut rng = StdRng::seed_from_u64(5);

        let _ = tokio::time::timeout(
            Duration::from_millis(2500),
            run_boot(&mut screen, &timing, &mut rng),
        )
        .await;
        let before = screen.contents();
        assert!(before.contains("\x1b[?25l"));
        assert!(!before.contains("\x1b[48;2;"));

        sleep(Duration::from_secs(5)).await;
        assert_eq!(screen.contents(), before);
    }

    #[test]
    fn live_transition_output() {
        let mut screen = AnsiScreen::new(Vec::new());
        live_transition(&mut screen);
        assert_eq!(
            screen.contents(),
            format!(
                "{}\r\n\x1b[5m─── Custodian-1 has seized control ───\x1b[0m\r\n\r\n> ",
                MATRIX.sequence()
            )
        );
    }
}
