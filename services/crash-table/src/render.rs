//! Terminal presentation of round events.

use crashline_execution::{curve_points, MultiplierCurve, RoundHistory};
use crashline_types::{HistoryBand, RoundEvent};
use serde::Serialize;

/// Smallest multiplier change printed as a new tick line in text mode.
const TICK_STEP: f64 = 0.1;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum Notice<'a> {
    #[serde(rename = "error")]
    Error { code: &'a str, message: String },
    #[serde(rename = "info")]
    Info { message: &'a str },
    #[serde(rename = "history")]
    History { crash_points: Vec<f64> },
}

/// Turns events into output lines, either status text or JSON lines.
#[derive(Debug)]
pub struct Renderer {
    json: bool,
    last_tick: f64,
}

impl Renderer {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            last_tick: 1.0,
        }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Line for `event`, or `None` when a text-mode tick is too close to the last one.
    pub fn event(&mut self, event: &RoundEvent) -> Option<String> {
        if self.json {
            return serde_json::to_string(event).ok();
        }
        match event {
            RoundEvent::RoundStarted { .. } => self.last_tick = 1.0,
            RoundEvent::MultiplierTick { multiplier, .. } => {
                if *multiplier - self.last_tick < TICK_STEP {
                    return None;
                }
                self.last_tick = *multiplier;
            }
            _ => {}
        }
        Some(event.to_string())
    }

    pub fn error(&self, code: &str, message: impl std::fmt::Display) -> String {
        let message = message.to_string();
        if self.json {
            return to_json_line(&Notice::Error { code, message });
        }
        format!("error: {message}")
    }

    pub fn info(&self, message: &str) -> String {
        if self.json {
            return to_json_line(&Notice::Info { message });
        }
        message.to_string()
    }

    pub fn history(&self, history: &RoundHistory) -> String {
        if self.json {
            return to_json_line(&Notice::History {
                crash_points: history.crash_points(),
            });
        }
        history_line(history)
    }
}

fn to_json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn band_marker(band: HistoryBand) -> char {
    match band {
        HistoryBand::Low => '-',
        HistoryBand::Medium => '~',
        HistoryBand::High => '+',
    }
}

/// `History: 7.00x+ 2.50x~ 1.23x-`, most recent first.
pub fn history_line(history: &RoundHistory) -> String {
    if history.is_empty() {
        return "History: (no rounds yet)".to_string();
    }
    let entries: Vec<String> = history
        .iter()
        .map(|record| format!("{record}{}", band_marker(record.band())))
        .collect();
    format!("History: {}", entries.join(" "))
}

/// One-line chart of `curve` from launch to `elapsed_secs`.
pub fn sparkline(curve: &dyn MultiplierCurve, elapsed_secs: f64, width: usize) -> String {
    let points = curve_points(curve, elapsed_secs, width);
    let Some(&(_, top)) = points.last() else {
        return String::new();
    };
    let span = top - 1.0;
    points
        .iter()
        .map(|&(_, multiplier)| {
            if span <= 0.0 {
                return SPARK_LEVELS[0];
            }
            let level = ((multiplier - 1.0) / span * (SPARK_LEVELS.len() - 1) as f64).round();
            SPARK_LEVELS[(level as usize).min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crashline_execution::AcceleratingCurve;
    use crashline_types::CrashRecord;

    #[test]
    fn test_text_ticks_are_throttled() {
        let mut renderer = Renderer::new(false);
        let tick = |multiplier| RoundEvent::MultiplierTick {
            round_id: 1,
            multiplier,
        };
        assert_eq!(renderer.event(&tick(1.05)), None);
        assert_eq!(renderer.event(&tick(1.12)), Some("1.12x".to_string()));
        assert_eq!(renderer.event(&tick(1.2)), None);
        assert_eq!(renderer.event(&tick(1.25)), Some("1.25x".to_string()));

        renderer.event(&RoundEvent::RoundStarted {
            round_id: 2,
            start_time_ms: 0,
        });
        assert_eq!(renderer.event(&tick(1.15)), Some("1.15x".to_string()));
    }

    #[test]
    fn test_text_status_lines() {
        let mut renderer = Renderer::new(false);
        assert_eq!(
            renderer.event(&RoundEvent::Crashed {
                round_id: 1,
                crash_point: 1.2,
                bet_lost: true,
            }),
            Some("CRASHED at 1.20x! You lost your bet!".to_string())
        );
        assert_eq!(
            renderer.event(&RoundEvent::CashedOut {
                round_id: 1,
                multiplier: 2.5,
                winnings: 25.0,
            }),
            Some("Cashed out at 2.50x! Won 25.00".to_string())
        );
    }

    #[test]
    fn test_json_mode_emits_every_event() {
        let mut renderer = Renderer::new(true);
        let line = renderer
            .event(&RoundEvent::MultiplierTick {
                round_id: 3,
                multiplier: 1.01,
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "multiplier_tick");
        assert_eq!(value["roundId"], 3);

        let error: serde_json::Value =
            serde_json::from_str(&renderer.error("ROUND_IN_PROGRESS", "wait")).unwrap();
        assert_eq!(error["type"], "error");
        assert_eq!(error["code"], "ROUND_IN_PROGRESS");
    }

    #[test]
    fn test_history_line_bands() {
        let mut history = RoundHistory::new(10);
        for (round_id, crash_point) in [(1, 1.23), (2, 2.5), (3, 7.0)] {
            history.record(CrashRecord {
                round_id,
                crash_point,
            });
        }
        assert_eq!(history_line(&history), "History: 7.00x+ 2.50x~ 1.23x-");
        assert_eq!(history_line(&RoundHistory::new(10)), "History: (no rounds yet)");

        let value: serde_json::Value =
            serde_json::from_str(&Renderer::new(true).history(&history)).unwrap();
        assert_eq!(value["crash_points"], serde_json::json!([7.0, 2.5, 1.23]));
    }

    #[test]
    fn test_sparkline_rises() {
        let line = sparkline(&AcceleratingCurve::default(), 10.0, 8);
        let chars: Vec<char> = line.chars().collect();
        assert_eq!(chars.len(), 8);
        assert_eq!(chars[0], '▁');
        assert_eq!(chars[7], '█');
        assert!(chars.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(sparkline(&AcceleratingCurve::default(), 10.0, 0), "");
    }
}
