// MOODTUNE Main Entry Point
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE

use moodtune_core::agent::camera::FfmpegCamera;
use moodtune_core::agent::catalog::{SpotifyCatalog, SpotifyCredentials, TrackCatalog};
use moodtune_core::agent::classifier::EmotionClassifier;
use moodtune_core::agent::emotion::{map_to_category, EmotionLabel};
use moodtune_core::agent::health;
use moodtune_core::agent::library::LocalLibrary;
use moodtune_core::agent::media::RodioEngine;
use moodtune_core::agent::mood_loop::{LoopCommand, MoodLoop};
use moodtune_core::agent::recognizer::HttpRecognizer;
use moodtune_core::agent::selector::PlaybackSelector;
use moodtune_core::agent::session::PlaybackSession;
use moodtune_core::config::Config;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "moodtune")]
#[command(about = "Plays music that matches the mood on your face", long_about = None)]
struct Cli {
    /// Path to a moodtune.json config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Local music directory (overrides config)
    #[arg(long, global = true)]
    music_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the webcam and keep the music in step with your mood
    Run {
        /// Camera device (e.g. /dev/video0)
        #[arg(short, long)]
        device: Option<String>,

        /// Emotion recognizer endpoint
        #[arg(short, long)]
        recognizer_url: Option<String>,
    },

    /// Show which mood and genres an emotion maps to
    Map {
        /// Emotion label (happy, sad, angry, fear, surprise, disgust, neutral)
        #[arg(short, long)]
        emotion: String,
    },

    /// Pick and play one track for an emotion, then exit
    Play {
        #[arg(short, long)]
        emotion: String,
    },

    /// List playable files in the local music directory
    Library,

    /// Print the effective configuration as JSON
    Config,

    /// Check external tool availability
    Health,
}

fn build_selector(cfg: &Config) -> anyhow::Result<PlaybackSelector> {
    let library = LocalLibrary::open(&cfg.music_directory, &cfg.supported_formats)?;

    let catalog: Option<Box<dyn TrackCatalog>> = match SpotifyCredentials::from_env() {
        Some(creds) => {
            info!("[CATALOG] Spotify credentials found (market {}).", cfg.catalog.market);
            Some(Box::new(SpotifyCatalog::new(creds, cfg.catalog_timeout())) as Box<dyn TrackCatalog>)
        }
        None => None,
    };

    let engine = RodioEngine::new()?;
    Ok(PlaybackSelector::new(
        cfg.genres.clone(),
        catalog,
        library,
        Box::new(engine),
        cfg.selector_settings(),
    ))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,symphonia=error");
    }
    tracing_subscriber::fmt::init();

    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("🚨 [MOODTUNE PANIC] at {}: {}", location, message);
    }));

    let args = Cli::parse();

    let mut cfg = Config::load(args.config.as_deref())?;
    if let Some(dir) = args.music_dir {
        cfg.music_directory = dir;
    }

    match args.command {
        Commands::Run {
            device,
            recognizer_url,
        } => {
            info!("--- MOODTUNE v{} ---", env!("CARGO_PKG_VERSION"));

            let missing = health::check_dependencies();
            if !missing.is_empty() {
                warn!("⚠️ Missing dependencies: {:?}. The camera will not start.", missing);
            }

            if let Some(device) = device {
                cfg.camera_device = device;
            }
            if let Some(url) = recognizer_url {
                cfg.recognizer_url = url;
            }

            let camera = FfmpegCamera::open(&cfg.camera_device, cfg.webcam_resolution)?;
            let recognizer = HttpRecognizer::new(&cfg.recognizer_url, cfg.recognizer_timeout());
            info!("[SENSOR] Recognizer at {}", recognizer.endpoint());

            let classifier = EmotionClassifier::new(
                Box::new(camera),
                Box::new(recognizer),
                cfg.detection_interval(),
                cfg.confidence_threshold,
            );
            let selector = build_selector(&cfg)?;
            let mut mood_loop = MoodLoop::new(classifier, selector, cfg.loop_settings());

            let stop = Arc::new(AtomicBool::new(false));
            let stop_signal = stop.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    stop_signal.store(true, Ordering::Relaxed);
                }
            });

            let (control_tx, control_rx) = mpsc::channel(8);
            std::thread::spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    match LoopCommand::parse(&line) {
                        Some(command) => {
                            if control_tx.blocking_send(command).is_err() {
                                break;
                            }
                        }
                        None => eprintln!("Controls: p = pause/resume, s = stop music, q = quit"),
                    }
                }
            });

            info!("Controls: p = pause/resume, s = stop music, q = quit (or Ctrl+C).");
            mood_loop.run(stop, control_rx).await;
        }
        Commands::Map { emotion } => {
            let category = map_to_category(&emotion);
            if emotion.parse::<EmotionLabel>().is_err() {
                println!("'{}' is not a known emotion; using the default mood.", emotion);
            }
            println!("{} → {}", emotion, category);
            match cfg.genres.get(&category) {
                Some(profile) => println!(
                    "   genres: {} | mood: {} | energy: {:?}",
                    profile.genres.join(", "),
                    profile.mood,
                    profile.energy
                ),
                None => println!("   no genre profile (local library only)"),
            }
        }
        Commands::Play { emotion } => {
            let category = map_to_category(&emotion);
            let mut selector = build_selector(&cfg)?;
            let mut session = PlaybackSession::new();

            let track = match selector.select_track(category).await {
                Ok(track) => track,
                Err(e) => {
                    println!("❌ {}", e);
                    return Ok(());
                }
            };
            if let Err(e) = selector.play(&mut session, track).await {
                error!("Playback failed: {}", e);
                return Ok(());
            }
            if let Some(info) = session.current_track_info() {
                match info.artist {
                    Some(artist) => println!("🎵 {} - {} ({:?})", artist, info.name, info.source),
                    None => println!("🎵 {} ({:?})", info.name, info.source),
                }
            }

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);
            while selector.engine_playing() {
                tokio::select! {
                    _ = &mut ctrl_c => break,
                    _ = tokio::time::sleep(Duration::from_millis(250)) => {}
                }
            }
            selector.stop(&mut session);
        }
        Commands::Library => {
            let library = LocalLibrary::open(&cfg.music_directory, &cfg.supported_formats)?;
            let files = library.scan();
            println!("📂 {} ({} tracks)", library.root().display(), files.len());
            for f in files {
                println!("   {}", f.display());
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        Commands::Health => {
            let missing = health::check_dependencies();
            if missing.is_empty() {
                println!("✅ All external tools found.");
            } else {
                println!("❌ Missing: {}", missing.join(", "));
            }
            let creds = if SpotifyCredentials::from_env().is_some() { "present" } else { "absent (local-only)" };
            println!("   Spotify credentials: {}", creds);
        }
    }

    Ok(())
}
