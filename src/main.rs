use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use skyburst::config::{Args, Config};
use skyburst::show::Show;
use skyburst::surface::Canvas;
use skyburst::terminal::{self, Presenter, Session};
use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

fn init_logging(path: Option<&Path>) -> Result<()> {
    // The alternate screen owns stderr, so logs only go to a file
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("opening log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("installing logger")?;
    Ok(())
}

fn run(config: &Config) -> Result<()> {
    let mut session = Session::begin().context("entering alternate screen")?;

    let Some((cols, rows)) = terminal::wait_for_viewport()? else {
        return Ok(());
    };
    let (width, height) = terminal::viewport_for(cols, rows, config.cell_size);
    log::info!("viewport {width}x{height} ({cols}x{rows} cells)");

    let mut show = Show::new(Canvas::new(width, height, config.cell_size), config.tuning);
    let mut presenter = Presenter::new(config.bg_color);

    let fixed_dt = 1.0 / config.fps as f32;
    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;

    loop {
        while event::poll(Duration::from_millis(1))? {
            match event::read()? {
                Event::Key(key) if terminal::is_quit(&key) => return Ok(()),
                Event::Resize(cols, rows) => {
                    let (width, height) = terminal::viewport_for(cols, rows, config.cell_size);
                    show.resize(width, height);
                    session.clear()?;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        accumulator += now.duration_since(last_frame).as_secs_f32();
        last_frame = now;
        if accumulator > fixed_dt * 3.0 {
            accumulator = fixed_dt * 3.0;
        }

        let mut stepped = false;
        while accumulator >= fixed_dt {
            show.tick();
            accumulator -= fixed_dt;
            stepped = true;
        }

        if stepped {
            presenter.present(show.surface(), session.out())?;
        }
    }
}

fn main() -> Result<()> {
    let config = Config::try_from(Args::parse())?;
    init_logging(config.log_file.as_deref())?;
    log::info!(
        "starting: spawn chance {}, cap {}, trail fade {}, cell {}, {} fps, {:?} particles",
        config.tuning.spawn_chance,
        config.tuning.max_fireworks,
        config.tuning.trail_fade,
        config.cell_size,
        config.fps,
        config.tuning.particle_colors
    );

    let result = run(&config);
    if let Err(err) = &result {
        log::error!("{err:#}");
    }
    result
}
