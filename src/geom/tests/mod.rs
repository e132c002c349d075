mod test_heightfield_basic;
mod test_mesh_sanity;
