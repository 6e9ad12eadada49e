use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use glam::{DVec2, DVec3};
use hecs::World;
use tracing_subscriber::EnvFilter;

use lumiere::camera::{Camera, Viewport};
use lumiere::components::{LightRig, Name, ReflectMode};
use lumiere::config::LumiereConfig;
use lumiere::engine::clock::parameters_on;
use lumiere::engine::{InputEvent, Modifiers, PointerButton};
use lumiere::scene::load_studio_scene;
use lumiere::{sun_position, LightPlacementController, PoseUpdate};

#[derive(Parser)]
#[command(name = "lumiere", about = "Interactive light placement core")]
struct Args {
    /// TOML config with [light], [sun] and [camera] sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the sun position for a date, time and place
    Sun {
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Hours ahead of UTC; defaults to the local zone
        #[arg(long, allow_hyphen_values = true)]
        utc_offset: Option<f64>,
        /// YYYY-MM-DD; defaults to today
        #[arg(long)]
        date: Option<String>,
        /// HH:MM; defaults to now
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        distance: Option<f64>,
    },
    /// Click into the demo studio and print where the key light lands
    Place {
        /// Pointer x in pixels; defaults to the viewport centre
        #[arg(long)]
        x: Option<f64>,
        #[arg(long)]
        y: Option<f64>,
        #[arg(long, value_enum)]
        mode: Option<ReflectMode>,
        #[arg(long)]
        range: Option<f64>,
        /// Follow the click with a shift-held move (reorient only)
        #[arg(long)]
        shift: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => LumiereConfig::load(path)?,
        None => LumiereConfig::default(),
    };

    match args.command {
        Command::Sun {
            lat,
            lon,
            utc_offset,
            date,
            time,
            distance,
        } => run_sun(&config, lat, lon, utc_offset, date, time, distance),
        Command::Place {
            x,
            y,
            mode,
            range,
            shift,
        } => run_place(&config, x, y, mode, range, shift),
    }
}

fn run_sun(
    config: &LumiereConfig,
    lat: Option<f64>,
    lon: Option<f64>,
    utc_offset: Option<f64>,
    date: Option<String>,
    time: Option<String>,
    distance: Option<f64>,
) -> anyhow::Result<()> {
    let latitude = lat.unwrap_or(config.sun.latitude);
    let longitude = lon.unwrap_or(config.sun.longitude);
    let distance = distance.unwrap_or(config.sun.distance);

    let now = Local::now();
    let date = match date {
        Some(date) => NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .with_context(|| format!("invalid --date {date:?}, expected YYYY-MM-DD"))?,
        None => now.date_naive(),
    };
    let time = match time {
        Some(time) => NaiveTime::parse_from_str(&time, "%H:%M")
            .with_context(|| format!("invalid --time {time:?}, expected HH:MM"))?,
        None => now.time(),
    };
    let utc_offset = utc_offset.unwrap_or(now.offset().local_minus_utc() as f64 / 3600.0);
    let params = parameters_on(date, time, utc_offset, latitude, longitude);

    tracing::debug!(?params, "computing sun position");
    let sun = sun_position(&params, distance);
    let euler = sun.rotation_euler();

    println!(
        "{:04}-{:02}-{:02} {:05.2}h UTC{:+} at {:.4}, {:.4}",
        params.year,
        params.month,
        params.day,
        params.local_time,
        params.utc_offset,
        latitude,
        longitude
    );
    println!("elevation  {:>9.3} deg", sun.elevation);
    println!("azimuth    {:>9.3} deg", sun.azimuth);
    println!("location   {}", fmt_vec(sun.location));
    let degrees = DVec3::new(
        euler.x.to_degrees(),
        euler.y.to_degrees(),
        euler.z.to_degrees(),
    );
    println!("rotation   {}", fmt_vec(degrees));
    Ok(())
}

fn run_place(
    config: &LumiereConfig,
    x: Option<f64>,
    y: Option<f64>,
    mode: Option<ReflectMode>,
    range: Option<f64>,
    shift: bool,
) -> anyhow::Result<()> {
    let mut settings = config.light.settings();
    if let Some(mode) = mode {
        settings.reflect_mode = mode;
    }
    if let Some(range) = range {
        settings.range = range;
    }

    let [width, height] = config.camera.viewport;
    let viewport = Viewport::new(width, height);
    let camera = Camera::looking_at(
        DVec3::from_array(config.camera.position),
        DVec3::from_array(config.camera.target),
        config.camera.fov,
    );
    let pointer = DVec2::new(x.unwrap_or(width / 2.0), y.unwrap_or(height / 2.0));
    if !viewport.contains(pointer) {
        anyhow::bail!("pointer {pointer} is outside the {width}x{height} viewport");
    }

    let mut world = World::new();
    let studio = load_studio_scene(&mut world, settings);

    let mut controller = LightPlacementController::new(settings);
    controller.select(Some(studio.key_light));
    controller.start();

    let moved = InputEvent::PointerMoved {
        position: pointer,
        modifiers: Modifiers::default(),
    };
    controller.handle_event(&mut world, &camera, viewport, moved);
    let mut update = controller.handle_event(
        &mut world,
        &camera,
        viewport,
        InputEvent::ButtonPressed(PointerButton::Primary),
    );
    if shift {
        let turned = InputEvent::PointerMoved {
            position: pointer,
            modifiers: Modifiers { shift: true },
        };
        update = controller.handle_event(&mut world, &camera, viewport, turned);
    }
    controller.handle_event(
        &mut world,
        &camera,
        viewport,
        InputEvent::ButtonReleased(PointerButton::Primary),
    );

    let rig = world
        .get::<&LightRig>(studio.key_light)
        .map_err(|_| anyhow::anyhow!("key light has no rig"))?;
    match update {
        PoseUpdate::Moved { hit: Some(hit) } => {
            let name = world
                .get::<&Name>(hit.target)
                .map(|n| n.0.clone())
                .unwrap_or_else(|_| format!("{:?}", hit.target));
            println!("hit        {name} at {}", fmt_vec(hit.point));
        }
        PoseUpdate::Reoriented => println!("reoriented toward pivot"),
        PoseUpdate::Moved { hit: None } | PoseUpdate::Unchanged => {
            println!("no surface under pointer")
        }
    }
    let pose = rig.pose();
    println!("mode       {:?}", rig.settings.reflect_mode);
    println!("location   {}", fmt_vec(pose.location));
    println!("direction  {}", fmt_vec(pose.direction));
    println!("range      {:.3}", pose.range);
    println!(
        "orbit      az {:.2} polar {:.2}",
        rig.spherical().azimuth,
        rig.spherical().polar
    );
    Ok(())
}

fn fmt_vec(v: DVec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}
