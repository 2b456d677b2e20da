//! Tilt Ball headless driver
//!
//! Feeds a session from a synthetic or recorded sample stream and prints the
//! session statistics as JSON. Set `RUST_LOG=debug` to see every frame.
//!
//! ```text
//! tilt-ball [--seed N] [--samples N] [--size WxH] [--settings FILE] [--replay FILE]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use tilt_ball::renderer::{BallFrame, Renderer};
    use tilt_ball::sim::AccelerationSample;
    use tilt_ball::source::{SyntheticTilt, load_recording};
    use tilt_ball::{CycleOutcome, PhysicsSettings, Session};

    /// Logs sprite placement instead of drawing it
    #[derive(Default)]
    struct LogRenderer {
        frames: u64,
    }

    impl Renderer for LogRenderer {
        fn draw_ball(&mut self, frame: &BallFrame) {
            self.frames += 1;
            let origin = frame.sprite_origin();
            log::debug!(
                "frame {}: sprite at ({:.1}, {:.1}) size {}",
                self.frames,
                origin.x,
                origin.y,
                frame.sprite_size()
            );
        }
    }

    struct Options {
        seed: u64,
        samples: usize,
        size: (f32, f32),
        settings: Option<String>,
        replay: Option<String>,
    }

    impl Default for Options {
        fn default() -> Self {
            Self {
                seed: 42,
                samples: 500,
                size: (1080.0, 1920.0),
                settings: None,
                replay: None,
            }
        }
    }

    fn parse_size(s: &str) -> Option<(f32, f32)> {
        let (w, h) = s.split_once('x')?;
        Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
    }

    fn parse_args() -> Result<Options, String> {
        let mut opts = Options::default();
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            let mut value = || args.next().ok_or_else(|| format!("{} needs a value", arg));
            match arg.as_str() {
                "--seed" => opts.seed = value()?.parse().map_err(|e| format!("--seed: {}", e))?,
                "--samples" => {
                    opts.samples = value()?.parse().map_err(|e| format!("--samples: {}", e))?
                }
                "--size" => {
                    let v = value()?;
                    opts.size = parse_size(&v).ok_or_else(|| format!("--size: bad size {}", v))?
                }
                "--settings" => opts.settings = Some(value()?),
                "--replay" => opts.replay = Some(value()?),
                other => return Err(format!("unknown argument {}", other)),
            }
        }
        Ok(opts)
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let opts = parse_args()?;

        let settings = match &opts.settings {
            Some(path) => PhysicsSettings::load(path),
            None => PhysicsSettings::default(),
        };

        let samples: Vec<AccelerationSample> = match &opts.replay {
            Some(path) => {
                let samples = load_recording(path)?;
                log::info!("Replaying {} samples from {}", samples.len(), path);
                samples
            }
            None => {
                log::info!("Synthetic stream: seed {}, {} samples", opts.seed, opts.samples);
                SyntheticTilt::new(opts.seed, opts.samples).collect()
            }
        };

        let mut session = Session::new(settings);
        let mut renderer = LogRenderer::default();

        session.on_resize(opts.size.0, opts.size.1);
        session.on_start();
        for sample in &samples {
            match session.on_sample(sample, &mut renderer) {
                Ok(CycleOutcome::Rendered(report)) if report.hits.any() => {
                    log::info!("Bounce {:?} (dominant axis {})", report.hits, report.dominant_axis.as_str());
                }
                Ok(_) => {}
                Err(rejection) => log::warn!("Skipped sample: {}", rejection),
            }
        }
        session.on_stop();

        let stats = session.stats();
        log::info!(
            "{} cycles, {} bounces, {} rejected",
            stats.cycles,
            stats.bounces(),
            stats.rejected()
        );

        if let Some(frame) = session.frame() {
            log::info!("Ball at ({:.1}, {:.1})", frame.center.x, frame.center.y);
        }
        println!("{}", serde_json::to_string_pretty(session.stats())?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tilt Ball (headless) starting...");

    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The platform layer embeds the library directly on wasm
}
