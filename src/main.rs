use eframe::egui;

use searchscape::SceneConfig;

mod app;

use app::source::SceneSource;
use app::SearchscapeApp;

struct Args {
    source: SceneSource,
    config: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut source = SceneSource::Demo;
    let mut config = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--events" => {
                let path = args.next().ok_or("--events needs a path")?;
                source = SceneSource::Events(path.into());
            }
            "--config" => {
                config = Some(args.next().ok_or("--config needs a path")?);
            }
            "-h" | "--help" => {
                return Err("usage: searchscape [SCENE.json] [--events EVENTS.csv|EVENTS.json] [--config CONFIG.json]".into());
            }
            other if other.starts_with("--") => return Err(format!("unknown option {other}")),
            path => source = SceneSource::File(path.into()),
        }
    }
    Ok(Args { source, config })
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    let cfg = match args.config.as_deref() {
        Some(path) => match SceneConfig::from_json_file(path) {
            Ok(cfg) => {
                log::info!("Loaded config from {path}");
                cfg
            }
            Err(e) => {
                eprintln!("config {path}: {e}");
                std::process::exit(2);
            }
        },
        None => SceneConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1400.0, 820.0]),
        ..Default::default()
    };

    log::info!("Starting searchscape viewer ({})", args.source);
    eframe::run_native(
        "Searchscape: search terrain",
        options,
        Box::new(move |cc| Ok(Box::new(SearchscapeApp::new(&cc.egui_ctx, cfg, args.source)))),
    )
    .expect("Failed to start searchscape");
}
