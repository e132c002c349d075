use crate::geom::{MeshDiagnostics, TerrainMesh, edge_topology};

fn tetrahedron() -> TerrainMesh {
    TerrainMesh::new(
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
        vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]],
    )
}

#[test]
fn terrain_mesh_validate_rejects_bad_buffers() {
    let mesh = TerrainMesh::new(vec![[0.0, 0.0, 0.0]], vec![[0, 1, 0]]);
    assert!(mesh.validate().is_err());

    let mesh = TerrainMesh::new(vec![[f64::NAN, 0.0, 0.0]], Vec::new());
    assert!(mesh.validate().is_err());

    tetrahedron().validate().expect("valid tetrahedron");
}

#[test]
fn closed_tetrahedron_is_watertight() {
    let mesh = tetrahedron();
    let topology = edge_topology(&mesh.faces);
    assert_eq!(topology.edge_count, 6);
    assert!(topology.is_closed_manifold());

    let diag = MeshDiagnostics::from_mesh(&mesh);
    assert_eq!(diag.vertex_count, 4);
    assert_eq!(diag.triangle_count, 4);
    assert!(diag.is_watertight());
    assert!((diag.signed_volume - 1.0 / 6.0).abs() < 1e-12);
    assert_eq!(diag.summary(), "V:4 T:4");
}

#[test]
fn open_and_flipped_meshes_are_reported() {
    let mut mesh = tetrahedron();
    mesh.faces.pop();
    let diag = MeshDiagnostics::from_mesh(&mesh);
    assert_eq!(diag.open_edge_count, 3);
    assert!(!diag.is_watertight());
    assert!(diag.summary().contains("open:3"));

    let mut mesh = tetrahedron();
    mesh.faces[0] = [0, 1, 2];
    let topology = edge_topology(&mesh.faces);
    assert_eq!(topology.inconsistent_edge_count, 3);
    assert_eq!(topology.open_edge_count, 0);

    let mut mesh = tetrahedron();
    for face in &mut mesh.faces {
        face.swap(1, 2);
    }
    let diag = MeshDiagnostics::from_mesh(&mesh);
    assert!(diag.is_watertight());
    assert!(diag.signed_volume < 0.0);
    assert!(diag.warnings.iter().any(|w| w.contains("inward")));
}

#[test]
fn triangles_resolve_face_positions() {
    let mesh = tetrahedron();
    let tris: Vec<_> = mesh.triangles().collect();
    assert_eq!(tris.len(), 4);
    assert_eq!(tris[1], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
    assert_eq!(mesh.triangle(9), None);

    let normal = mesh.face_normal(0).unwrap();
    assert!((normal.z + 1.0).abs() < 1e-12);
    assert_eq!(mesh.degenerate_triangle_count(), 0);
}
