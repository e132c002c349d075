use contour_relief::export::stl::{StlFormat, binary_stl_bytes, export_split_stl, export_stl};
use contour_relief::geom::{CutPlane, InterpolationMethod, Vec3, edge_topology};
use contour_relief::pipeline::{ReliefError, ReliefOptions, ReliefSummary, contours_to_relief};

const HILL: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "elevation": 100 },
            "geometry": {
                "type": "LineString",
                "coordinates": [[0, 0], [20, 0], [20, 20], [0, 20], [0, 0]]
            }
        },
        {
            "type": "Feature",
            "properties": { "elevation": 120 },
            "geometry": {
                "type": "LineString",
                "coordinates": [[5, 5], [15, 5], [15, 15], [5, 15], [5, 5]]
            }
        },
        {
            "type": "Feature",
            "properties": { "elevation": 140 },
            "geometry": { "type": "Point", "coordinates": [10, 10] }
        }
    ]
}"#;

fn options() -> ReliefOptions {
    ReliefOptions {
        cell_size: 2.5,
        scale_z: 15.0,
        base_thickness: 3.0,
        ..ReliefOptions::default()
    }
}

#[test]
fn contours_become_a_watertight_solid() {
    let relief = contours_to_relief(HILL, &options()).expect("relief");

    assert_eq!(relief.field.width(), 9);
    assert_eq!(relief.field.height(), 9);
    assert!((relief.field.min_elevation() - 100.0).abs() < 1e-9);
    assert!((relief.field.max_elevation() - 140.0).abs() < 1e-9);
    // Peak sits at the grid centre.
    assert!((relief.field.at(4, 4).unwrap() - 140.0).abs() < 1e-9);

    assert_eq!(relief.mesh.vertex_count(), 2 * 81);
    assert_eq!(relief.mesh.triangle_count(), 4 * 64 + 4 * 16);
    assert!(edge_topology(&relief.mesh.faces).is_closed_manifold());
    assert!(relief.diagnostics.is_watertight());
    assert!(relief.mesh.signed_volume() > 0.0);

    let top = relief.mesh.vertices[..81].iter().map(|v| v[2]);
    assert!(top.clone().all(|z| (0.0..=15.0 + 1e-9).contains(&z)));
    assert!(relief.mesh.vertices[81..].iter().all(|v| v[2] == -3.0));
}

#[test]
fn binary_stl_holds_every_facet() {
    let relief = contours_to_relief(HILL, &options()).unwrap();
    let bytes = binary_stl_bytes(&relief.mesh, "hill").unwrap();

    assert_eq!(bytes.len(), 84 + 50 * relief.mesh.triangle_count());
    let count = u32::from_le_bytes(bytes[80..84].try_into().unwrap());
    assert_eq!(count as usize, relief.mesh.triangle_count());
}

#[test]
fn export_refuses_to_overwrite_unless_asked() {
    let relief = contours_to_relief(HILL, &options()).unwrap();
    let dir = std::env::temp_dir().join(format!("contour-relief-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("hill.stl");
    let _ = std::fs::remove_file(&path);

    export_stl(&path, &relief.mesh, StlFormat::Binary, false).expect("first export");
    let written = std::fs::metadata(&path).unwrap().len();
    assert_eq!(written as usize, 84 + 50 * relief.mesh.triangle_count());

    assert!(export_stl(&path, &relief.mesh, StlFormat::Binary, false).is_err());
    export_stl(&path, &relief.mesh, StlFormat::Ascii, true).expect("overwrite");
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("solid hill"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn fixed_grid_and_nearest_method_from_json() {
    let options = ReliefOptions::from_json(
        r#"{ "grid_size": { "width": 5, "height": 4 }, "method": "nearest", "scale_z": 2 }"#,
    )
    .unwrap();
    assert_eq!(options.method, InterpolationMethod::Nearest);

    let relief = contours_to_relief(HILL, &options).unwrap();
    let summary = ReliefSummary::from(&relief);
    assert_eq!(summary.grid_width, 5);
    assert_eq!(summary.grid_height, 4);
    assert_eq!(summary.vertex_count, 40);
    assert_eq!(summary.triangle_count, 4 * 4 * 3 + 4 * (4 + 3));
    assert!(summary.watertight);
    assert!(summary.warnings.is_empty());
}

#[test]
fn pipeline_errors_name_their_stage() {
    let err = contours_to_relief("{ not json", &options()).unwrap_err();
    assert!(matches!(err, ReliefError::Parse(_)));

    let empty = r#"{ "type": "FeatureCollection", "features": [] }"#;
    let err = contours_to_relief(empty, &options()).unwrap_err();
    assert!(err.to_string().contains("no elevation samples"));

    let thin = ReliefOptions::from_json(r#"{ "grid_size": { "width": 1, "height": 5 } }"#).unwrap();
    let err = contours_to_relief(HILL, &thin).unwrap_err();
    assert!(matches!(err, ReliefError::Solid(_)));
}

#[test]
fn solid_split_in_two_is_written_as_two_files() {
    let relief = contours_to_relief(HILL, &options()).unwrap();
    let plane = CutPlane::new(Vec3::new(1.0, 0.0, 0.0), 10.0).unwrap();
    let (below, above) = relief.mesh.split_by_plane(&plane).unwrap();

    assert!(below.triangle_count() > 0);
    assert!(above.triangle_count() > 0);
    assert!(below.vertices.iter().all(|v| v[0] <= 10.0 + 1e-9));
    assert!(above.vertices.iter().all(|v| v[0] >= 10.0 - 1e-9));

    let dir = std::env::temp_dir().join(format!("contour-relief-split-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let (path_a, path_b) =
        export_split_stl(&dir.join("hill.stl"), &below, &above, StlFormat::Binary, true).unwrap();

    assert!(path_a.ends_with("hill_a.stl"));
    assert!(path_b.ends_with("hill_b.stl"));
    let size_a = std::fs::metadata(&path_a).unwrap().len() as usize;
    let size_b = std::fs::metadata(&path_b).unwrap().len() as usize;
    assert_eq!(size_a, 84 + 50 * below.triangle_count());
    assert_eq!(size_b, 84 + 50 * above.triangle_count());

    std::fs::remove_dir_all(&dir).unwrap();
}
