use kernelcheck_core::{build_graph, DType, HarnessError, Shape};

#[test]
fn builds_vector_to_scalar_graph() {
    let graph = build_graph("max_vector_1d", "max_1d_vector", 10, DType::I32, DType::I32)
        .expect("well-formed graph");

    assert_eq!(graph.kernel, "max_1d_vector");
    assert_eq!(graph.input.shape, Shape::vector(10));
    assert_eq!(graph.input.dtype, DType::I32);
    assert_eq!(graph.output.shape, Shape::vector(1));
    assert!(graph.parameters.is_empty());

    let graph = graph.with_parameter("axis", "0");
    assert_eq!(graph.parameters.get("axis").map(String::as_str), Some("0"));
}

#[test]
fn length_one_is_well_formed() {
    assert!(build_graph("g", "min_1d_vector", 1, DType::F32, DType::F32).is_ok());
}

#[test]
fn malformed_graphs_are_rejected() {
    for (name, kernel, len) in [("", "k", 4), ("g", " ", 4), ("g", "k", 0)] {
        let err = build_graph(name, kernel, len, DType::F32, DType::F32).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidGraph { .. }));
        assert_eq!(err.stage(), "build");
    }
}
