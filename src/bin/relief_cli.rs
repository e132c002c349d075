#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("relief_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use contour_relief::export::stl::{StlFormat, export_split_stl, export_stl};
    use contour_relief::geom::{CutPlane, GridSize, InterpolationMethod, Vec3};
    use contour_relief::pipeline::{ReliefOptions, contours_to_relief};
    use std::fs;
    use std::path::PathBuf;

    const USAGE: &str = r#"relief_cli (contour-relief)

Turn GeoJSON contour lines into a printable STL terrain solid.

USAGE:
  relief_cli <input.geojson> <output.stl> [options]

OPTIONS:
  --config <file>               JSON file with relief options (flags below override it)
  --cell-size <n>               Grid spacing in input units (default 1)
  --grid <W>x<H>                Explicit grid size, overrides --cell-size
  --scale-z <n>                 Height of the terrain above its lowest point (default 1)
  --base <n>                    Base thickness below the terrain (default 5)
  --method <linear|nearest>     Interpolation method (default linear)
  --elevation-property <name>   Feature property holding the elevation (default `elevation`)
  --split <nx>,<ny>,<nz>,<d>    Cut the solid by the plane through n*d and write
                                <output>_a.stl (below) and <output>_b.stl (above)
  --ascii                       Write ASCII STL instead of binary
  --overwrite                   Overwrite an existing output file
  -v, --verbose                 Log pipeline progress to stderr
  -h, --help                    Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let mut positional = Vec::new();
        let mut config_path: Option<PathBuf> = None;
        let mut overrides = Vec::new();
        let mut split: Option<CutPlane> = None;
        let mut format = StlFormat::Binary;
        let mut overwrite = false;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config_path = Some(PathBuf::from(args.value("--config")?)),
                "--cell-size" | "--grid" | "--scale-z" | "--base" | "--method"
                | "--elevation-property" => {
                    let value = args.value(&arg)?;
                    overrides.push((arg, value));
                }
                "--split" => split = Some(parse_plane(&args.value("--split")?)?),
                "--ascii" => format = StlFormat::Ascii,
                "--overwrite" => overwrite = true,
                "-v" | "--verbose" => verbose = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other if other.starts_with('-') => {
                    return Err(format!("unknown option `{other}`\n\n{USAGE}"));
                }
                _ => positional.push(arg),
            }
        }

        let [input, output] = <[String; 2]>::try_from(positional)
            .map_err(|_| format!("expected an input and an output path\n\n{USAGE}"))?;

        let directive = if verbose { "debug" } else { "warn" };
        contour_relief::init_native_logger(directive).map_err(|err| err.to_string())?;

        let mut options = match &config_path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
                ReliefOptions::from_json(&text)
                    .map_err(|err| format!("invalid config {}: {err}", path.display()))?
            }
            None => ReliefOptions::default(),
        };
        for (flag, value) in &overrides {
            apply_override(&mut options, flag, value)?;
        }

        let geojson =
            fs::read_to_string(&input).map_err(|err| format!("failed to read {input}: {err}"))?;
        let relief = contours_to_relief(&geojson, &options).map_err(|err| err.to_string())?;
        for warning in &relief.diagnostics.warnings {
            eprintln!("warning: {warning}");
        }

        let output = PathBuf::from(output);
        if let Some(plane) = split {
            let (below, above) = relief
                .mesh
                .split_by_plane(&plane)
                .map_err(|err| err.to_string())?;
            let (path_a, path_b) = export_split_stl(&output, &below, &above, format, overwrite)
                .map_err(|err| err.to_string())?;
            println!(
                "{}: {} triangles, {}: {} triangles",
                path_a.display(),
                below.triangle_count(),
                path_b.display(),
                above.triangle_count()
            );
            return Ok(());
        }

        export_stl(&output, &relief.mesh, format, overwrite).map_err(|err| err.to_string())?;

        println!(
            "{}: {}x{} grid, {} vertices, {} triangles",
            output.display(),
            relief.field.width(),
            relief.field.height(),
            relief.mesh.vertex_count(),
            relief.mesh.triangle_count()
        );
        Ok(())
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn apply_override(options: &mut ReliefOptions, flag: &str, value: &str) -> Result<(), String> {
        match flag {
            "--cell-size" => options.cell_size = parse_number(flag, value)?,
            "--scale-z" => options.scale_z = parse_number(flag, value)?,
            "--base" => options.base_thickness = parse_number(flag, value)?,
            "--grid" => options.grid_size = Some(parse_grid(value)?),
            "--method" => {
                options.method = match value {
                    "linear" => InterpolationMethod::Linear,
                    "nearest" => InterpolationMethod::Nearest,
                    other => return Err(format!("unknown interpolation method `{other}`")),
                }
            }
            "--elevation-property" => options.elevation_property = value.to_owned(),
            other => return Err(format!("unknown option `{other}`")),
        }
        Ok(())
    }

    fn parse_number(flag: &str, value: &str) -> Result<f64, String> {
        value
            .parse::<f64>()
            .map_err(|_| format!("{flag} expects a number, got `{value}`"))
    }

    fn parse_grid(value: &str) -> Result<GridSize, String> {
        let (w, h) = value
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("--grid expects <W>x<H>, got `{value}`"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("--grid expects <W>x<H>, got `{value}`"))
        };
        Ok(GridSize::new(parse(w)?, parse(h)?))
    }

    fn parse_plane(value: &str) -> Result<CutPlane, String> {
        let numbers = value
            .split(',')
            .map(|part| parse_number("--split", part.trim()))
            .collect::<Result<Vec<_>, _>>()?;
        let [nx, ny, nz, d] = <[f64; 4]>::try_from(numbers)
            .map_err(|_| format!("--split expects <nx>,<ny>,<nz>,<d>, got `{value}`"))?;
        CutPlane::new(Vec3::new(nx, ny, nz), d).map_err(|err| err.to_string())
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }

}
