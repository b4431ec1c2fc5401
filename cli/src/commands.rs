use std::io::Write;
use std::path::Path;

use narrator_core::{AppConfig, Cue, EngineStatus, Player, parse_script};

use crate::CliContext;

/// `HH:MM:SS.mmm`
pub fn format_timecode(secs: f64) -> String {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    let (hours, rest) = (total_ms / 3_600_000, total_ms % 3_600_000);
    let (minutes, rest) = (rest / 60_000, rest % 60_000);
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, rest / 1000, rest % 1000)
}

pub fn print_cues(cues: &[Cue]) {
    if cues.is_empty() {
        println!("No cues");
        return;
    }

    println!("{:<14} {:>7} {:>6}  Text", "Time", "Pause", "Rate");
    println!("{}", "-".repeat(60));
    for cue in cues {
        println!(
            "{:<14} {:>7.2} {:>6.2}  {}",
            format_timecode(cue.trigger_time()),
            cue.pause_duration(),
            cue.speech_rate(),
            cue.text()
        );
    }
    println!("\nTotal: {} cues", cues.len());
}

/// Parse a script file once and print its cues
pub async fn list_cues(path: &Path) -> Result<(), String> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    print_cues(&parse_script(&raw));
    Ok(())
}

pub fn show_config(config: &AppConfig, path: Option<&Path>) {
    match path {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none)"),
    }
    let engine = &config.engine;
    println!("Engine:");
    println!("  poll interval:  {} ms", engine.poll_interval_ms);
    println!("  trigger window: {} s", engine.trigger_window_secs);
    println!("  resume policy:  {:?}", engine.resume_policy);
    println!("  overlap policy: {:?}", engine.overlap_policy);
    let audio = &config.audio;
    println!("Audio:");
    println!("  enabled:        {}", audio.enabled);
    println!("  voice:          {}", audio.voice.as_deref().unwrap_or("(default)"));
    println!("  base rate:      {} wpm", audio.base_words_per_minute);
}

pub fn play(ctx: &CliContext) -> Result<(), String> {
    ctx.player.play().map_err(|e| e.to_string())
}

pub fn pause(ctx: &CliContext) -> Result<(), String> {
    ctx.player.pause().map_err(|e| e.to_string())
}

pub fn seek(ctx: &CliContext, position: f64) -> Result<(), String> {
    ctx.player.seek(position).map_err(|e| e.to_string())?;
    println!("Seeked to {}", format_timecode(position.max(0.0)));
    Ok(())
}

pub fn set_rate(ctx: &CliContext, rate: f64) -> Result<(), String> {
    ctx.player.set_rate(rate).map_err(|e| e.to_string())
}

pub async fn show_status(ctx: &CliContext) -> Result<(), String> {
    let position = ctx.player.current_time().map_err(|e| e.to_string())?;
    let state = ctx.player.playback_state().map_err(|e| e.to_string())?;
    let rate = ctx.player.rate().map_err(|e| e.to_string())?;

    let status = match ctx.engine().status() {
        EngineStatus::Triggered { cue_time } => {
            format!("narrating cue at {}", format_timecode(cue_time))
        }
        other => format!("{other:?}").to_lowercase(),
    };
    let stats = ctx.engine().stats();

    println!("Position: {} ({:?}, x{})", format_timecode(position), state, rate);
    if let Some(end) = ctx.player.duration().map_err(|e| e.to_string())? {
        println!("Duration: {}", format_timecode(end));
    }
    println!("Engine:   {}", status);
    println!("Cues:     {}", ctx.store.len().await);
    println!(
        "Stats:    {} ticks, {} triggered, {} narrated, {} resumed, {} skipped",
        stats.ticks, stats.triggered, stats.narrated, stats.resumed, stats.skipped_ticks
    );
    Ok(())
}

pub fn reload(ctx: &CliContext) {
    ctx.script.touch();
    println!("Reloading {}", ctx.script.path().display());
}

pub async fn show_cues(ctx: &CliContext) {
    print_cues(&ctx.store.snapshot().await);
}

pub fn exit() {
    println!("quitting...");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timecodes_are_zero_padded() {
        assert_eq!(format_timecode(0.0), "00:00:00.000");
        assert_eq!(format_timecode(3723.5), "01:02:03.500");
        assert_eq!(format_timecode(59.9996), "00:01:00.000");
        assert_eq!(format_timecode(-4.0), "00:00:00.000");
    }
}
