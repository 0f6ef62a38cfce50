use anyhow::Context as _;
use clap::{Parser, Subcommand};
use interconnect_map::{
    data::{
        geocode::{geocode_records, Geocoder, DEFAULT_GEOCODER_URL},
        geojson::load_feature_collection,
        queue,
    },
    ui::widget::MapViewWidget,
    EngineOptions, FeatureCollection, MapView, MapViewConfig, NativeEngine,
};
use std::path::{Path, PathBuf};

/// Dataset shipped with the workspace
const DEFAULT_SOURCE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/interconnection.geojson");

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive map of the interconnection queue", long_about = None)]
struct Cli {
    /// GeoJSON FeatureCollection to show: a file path or an http(s) URL
    source: Option<String>,

    /// JSON file with map view settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Access token for the hosting service
    #[arg(long, env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Style identifier
    #[arg(long)]
    style: Option<String>,

    /// Initial center as LNG,LAT
    #[arg(long, value_parser = parse_center, allow_hyphen_values = true)]
    center: Option<[f64; 2]>,

    /// Initial zoom
    #[arg(long)]
    zoom: Option<f64>,

    /// Layer whose features open a popup on click
    #[arg(long)]
    layer: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert queue project records (a JSON array) into the GeoJSON the map serves
    Build {
        /// Project records to convert
        records: PathBuf,

        /// Where to write the FeatureCollection
        output: PathBuf,

        /// Strip "County" from counties and spell out state names first
        #[arg(long)]
        normalize: bool,

        /// Look up missing locations from "County, State"
        #[arg(long)]
        geocode: bool,

        /// Search endpoint used by --geocode
        #[arg(long, default_value = DEFAULT_GEOCODER_URL)]
        geocoder_url: String,
    },
}

fn parse_center(text: &str) -> Result<[f64; 2], String> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    let [lng, lat] = parts.as_slice() else {
        return Err(format!("expected LNG,LAT, got {:?}", text));
    };
    let lng = lng.parse::<f64>().map_err(|e| format!("longitude: {}", e))?;
    let lat = lat.parse::<f64>().map_err(|e| format!("latitude: {}", e))?;
    Ok([lng, lat])
}

/// Standalone viewer for the interconnection queue
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Build {
            ref records,
            ref output,
            normalize,
            geocode,
            ref geocoder_url,
        }) => {
            let geocoder = if geocode {
                Some(Geocoder::new(geocoder_url.as_str())?)
            } else {
                None
            };
            build(records, output, normalize, geocoder).await
        }
        None => {
            let config = view_config(&cli)?;
            let source = cli.source.as_deref().unwrap_or(DEFAULT_SOURCE);
            view(source, config).await
        }
    }
}

/// Settings file (or defaults plus `MAPBOX_ACCESS_TOKEN`), then command-line overrides
fn view_config(cli: &Cli) -> anyhow::Result<MapViewConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            MapViewConfig::from_json(&text)?.with_env_token()
        }
        None => MapViewConfig::from_env(),
    };

    if let Some(token) = &cli.token {
        config = config.with_access_token(token.as_str());
    }
    if let Some(style) = &cli.style {
        config = config.with_style(style.as_str());
    }
    if let Some([lng, lat]) = cli.center {
        config = config.with_center(lng, lat);
    }
    if let Some(zoom) = cli.zoom {
        config = config.with_zoom(zoom);
    }
    if let Some(layer) = &cli.layer {
        config = config.with_interaction_layer(layer.as_str());
    }
    Ok(config)
}

/// Converts queue records into the GeoJSON the map serves
async fn build(
    records_path: &Path,
    output: &Path,
    normalize: bool,
    geocoder: Option<Geocoder>,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(records_path)
        .with_context(|| format!("reading {}", records_path.display()))?;
    let mut records = queue::records_from_json(&text)?;

    if normalize {
        records.iter_mut().for_each(queue::ProjectRecord::normalize);
    }
    if let Some(geocoder) = geocoder {
        let located = geocode_records(&geocoder, &mut records).await;
        println!("Geocoded {} records", located);
    }

    let collection = queue::build_feature_collection(&records)?;
    collection.save(output)?;
    println!(
        "Done creating {} ({} features)",
        output.display(),
        collection.len()
    );
    Ok(())
}

async fn view(source: &str, config: MapViewConfig) -> anyhow::Result<()> {
    let features = load_feature_collection(source)
        .await
        .with_context(|| format!("loading features from {}", source))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Interconnection Queue Map"),
        ..Default::default()
    };

    eframe::run_native(
        "interconnect-map-app",
        options,
        Box::new(move |cc| Box::new(MapApp::new(cc, config, features))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {}", e))
}

/// The main application struct
struct MapApp {
    map_widget: MapViewWidget,
}

impl MapApp {
    fn new(
        _cc: &eframe::CreationContext<'_>,
        config: MapViewConfig,
        features: FeatureCollection,
    ) -> Self {
        let layer = config.interaction_layer.clone();
        let mut view = MapView::new(config);

        let mounted = view.mount(
            move |options: EngineOptions| -> interconnect_map::Result<NativeEngine> {
                let mut engine = NativeEngine::new(options)?;
                engine.add_layer(layer, features.features)?;
                Ok(engine)
            },
        );
        if let Err(e) = mounted {
            log::error!("Failed to initialize map: {}", e);
        }

        Self {
            map_widget: MapViewWidget::new(view),
        }
    }
}

impl eframe::App for MapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.map_widget.show(ui);
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_viewer_arguments() {
        let cli = Cli::try_parse_from([
            "interconnect-map-app",
            "https://example.com/queue.geojson",
            "--center",
            "-71.0,42.4",
            "--zoom",
            "10",
            "--layer",
            "projects",
            "--token",
            "pk.cli",
        ])
        .unwrap();
        assert_eq!(cli.source.as_deref(), Some("https://example.com/queue.geojson"));
        assert!(cli.command.is_none());

        let config = view_config(&cli).unwrap();
        assert_eq!(config.center, [-71.0, 42.4]);
        assert_eq!(config.zoom, 10.0);
        assert_eq!(config.interaction_layer, "projects");
        assert_eq!(config.access_token.as_deref(), Some("pk.cli"));
    }

    #[test]
    fn test_build_subcommand() {
        let cli = Cli::try_parse_from([
            "interconnect-map-app",
            "build",
            "records.json",
            "out.geojson",
            "--geocode",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Build {
                records,
                output,
                normalize,
                geocode,
                geocoder_url,
            }) => {
                assert_eq!(records, PathBuf::from("records.json"));
                assert_eq!(output, PathBuf::from("out.geojson"));
                assert!(!normalize);
                assert!(geocode);
                assert_eq!(geocoder_url, DEFAULT_GEOCODER_URL);
            }
            other => panic!("expected build, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_center_is_rejected() {
        assert!(parse_center("42.4").is_err());
        assert!(parse_center("west,42.4").is_err());
        assert_eq!(parse_center(" -71.0 , 42.4 "), Ok([-71.0, 42.4]));
    }

    #[test]
    fn test_default_source_exists() {
        assert!(Path::new(DEFAULT_SOURCE).exists());
    }
}
