//! Spike alert rendering.
//!
//! Produces the subject line, a plain-text body and an HTML table body for
//! one [`SpikeEvent`]. Volumes are printed with thousands separators and at
//! most three fraction digits.

use market::pulse::SpikeEvent;

use crate::model::Notification;

pub fn render_spike(event: &SpikeEvent) -> Notification {
    let symbol = &event.instrument.full_symbol;
    let ratio = event.ratio_display();
    let today = event.detected_on.format("%Y-%m-%d").to_string();
    let max_date = event.historical_max_date.format("%Y-%m-%d").to_string();
    let current = format_volume(event.current_volume);
    let max = format_volume(event.historical_max);

    let subject = format!("🚀 Volume Spike: {symbol} ({ratio}x)");

    let text = format!(
        "Coin: {symbol}\n\
         Date: {today}\n\
         Today's Volume: {current}\n\
         Previous Max Volume: {max} (on {max_date})\n\
         Spike Ratio: {ratio}x"
    );

    let html = format!(
        r#"<h2>🚀 Volume Spike Detected</h2>
<table border="1" cellpadding="8" cellspacing="0" style="border-collapse: collapse; font-family: Arial, sans-serif;">
  <thead>
    <tr style="background-color: #f2f2f2;">
      <th colspan="3" style="text-align: center; font-size: 20px; font-weight: bold;">{symbol}</th>
    </tr>
  </thead>
  <tbody>
    <tr>
      <td><strong>Today</strong></td>
      <td>{current}</td>
      <td>{today}</td>
    </tr>
    <tr>
      <td><strong>Previous Max</strong></td>
      <td>{max}</td>
      <td>{max_date}</td>
    </tr>
    <tr>
      <td><strong>Spike Ratio</strong></td>
      <td colspan="2" style="text-align: center;"><strong>{ratio}x</strong></td>
    </tr>
  </tbody>
</table>
"#,
        symbol = escape_html(symbol),
    );

    Notification {
        subject,
        text,
        html,
    }
}

/// `1234567.891` -> `1,234,567.891`; `1500.5` -> `1,500.5`; `42.0` -> `42`.
pub fn format_volume(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }

    let fixed = format!("{:.3}", v.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };

    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use market::types::Instrument;

    fn event() -> SpikeEvent {
        SpikeEvent {
            instrument: Instrument::new("XBTUSDTM", "KXBT"),
            current_volume: 450.0,
            historical_max: 200.0,
            historical_max_date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            ratio: 2.25,
            ratio_rounded: 2.25,
            detected_on: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    #[test]
    fn subject_carries_symbol_and_ratio() {
        let n = render_spike(&event());
        assert_eq!(n.subject, "🚀 Volume Spike: XBTUSDTM (2.25x)");
    }

    #[test]
    fn text_body_lists_every_field() {
        let n = render_spike(&event());
        assert_eq!(
            n.text,
            "Coin: XBTUSDTM\n\
             Date: 2024-06-01\n\
             Today's Volume: 450\n\
             Previous Max Volume: 200 (on 2024-03-07)\n\
             Spike Ratio: 2.25x"
        );
    }

    #[test]
    fn html_body_has_table_rows() {
        let n = render_spike(&event());
        assert!(n.html.contains("<h2>🚀 Volume Spike Detected</h2>"));
        assert!(n.html.contains("<td><strong>Today</strong></td>"));
        assert!(n.html.contains("<td>2024-03-07</td>"));
        assert!(n.html.contains("<strong>2.25x</strong>"));
    }

    #[test]
    fn ratio_keeps_two_decimals() {
        let mut e = event();
        e.ratio_rounded = 3.0;
        assert!(render_spike(&e).subject.ends_with("(3.00x)"));
    }

    #[test]
    fn volumes_are_grouped() {
        assert_eq!(format_volume(0.0), "0");
        assert_eq!(format_volume(999.0), "999");
        assert_eq!(format_volume(1000.0), "1,000");
        assert_eq!(format_volume(1_234_567.891), "1,234,567.891");
        assert_eq!(format_volume(1500.5), "1,500.5");
        assert_eq!(format_volume(0.12345), "0.123");
        assert_eq!(format_volume(-2500.0), "-2,500");
    }
}
