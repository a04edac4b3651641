//! Gamepad diagnostics tool for troubleshooting detection issues

use super::frame::GamepadFrame;
use super::gilrs_host::{standard_button_label, GilrsHost};
use super::host::GamepadHost;
use super::normalize::extract_triggers;
use std::thread;
use std::time::Duration;
use tracing::info;

/// Print detailed information about all detected gamepads
///
/// Waits a few seconds first so Bluetooth controllers have time to wake up,
/// then dumps each pad as the sampler would see it (raw values, before the
/// deadzone is applied).
pub fn print_gamepad_diagnostics(wait: Duration) {
    info!("=== Gamepad Diagnostics ===");
    info!("Platform: {}", std::env::consts::OS);

    let mut host = match GilrsHost::new() {
        Ok(host) => host,
        Err(e) => {
            info!("❌ {}", e);
            info!("This may indicate missing system libraries or permissions issues.");
            return;
        },
    };

    info!("⏳ Waiting for gamepads to connect ({} ms)...", wait.as_millis());
    let start = std::time::Instant::now();
    while start.elapsed() < wait {
        host.pump_events();
        thread::sleep(Duration::from_millis(100));
    }

    let slots = host.poll();
    let frames: Vec<_> = slots.into_iter().flatten().collect();

    if frames.is_empty() {
        info!("⚠️  No gamepads detected");
        info!("   Please check:");
        info!("   - Gamepad is connected (USB or Bluetooth paired)");
        info!("   - Drivers are installed");
        return;
    }

    info!("✅ Found {} gamepad(s):", frames.len());
    info!("");

    for raw in frames {
        let ff = host
            .gilrs()
            .gamepads()
            .find(|(id, _)| usize::from(*id) == raw.index)
            .map(|(_, gp)| (gp.is_ff_supported(), format!("{:?}", gp.power_info())));

        let frame = match GamepadFrame::try_from(raw) {
            Ok(frame) => frame,
            Err(e) => {
                info!("❌ {}", e);
                continue;
            },
        };

        for line in describe_frame(&frame) {
            info!("{}", line);
        }
        if let Some((rumble, power)) = ff {
            info!("   Rumble: {}", if rumble { "supported" } else { "not supported" });
            info!("   Power: {}", power);
        }
        info!("   ─────────────────────────────────");
    }

    info!("=== End Diagnostics ===");
}

/// Human-readable description of one frame
pub fn describe_frame(frame: &GamepadFrame) -> Vec<String> {
    let mut lines = vec![
        format!("📋 Gamepad index {}", frame.index),
        format!("   Name: \"{}\"", frame.name),
        format!("   Layout: {} buttons, {} axes", frame.pressed.len(), frame.axes.len()),
    ];

    let pressed: Vec<&str> = frame
        .pressed
        .iter()
        .enumerate()
        .filter(|(_, &p)| p)
        .map(|(i, _)| standard_button_label(i))
        .collect();
    if pressed.is_empty() {
        lines.push("   🎮 (no buttons currently pressed)".to_string());
    } else {
        lines.push(format!("   🎮 Pressed: {}", pressed.join(", ")));
    }

    let axes: Vec<String> = frame.axes.iter().map(|v| format!("{:+.3}", v)).collect();
    lines.push(format!("   🕹️  Axes: [{}]", axes.join(", ")));

    match extract_triggers(&frame.axes, &frame.button_values) {
        Some(triggers) => {
            let triggers: Vec<String> = triggers.iter().map(|v| format!("{:+.3}", v)).collect();
            lines.push(format!("   Triggers: [{}]", triggers.join(", ")));
        },
        None => lines.push("   Triggers: none".to_string()),
    }

    lines
}
