fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile the storage API contract consumed by the client.
    // Server stubs are generated too so the integration tests can stand up
    // an in-process service; the binary only ever uses the clients.
    tonic_prost_build::configure()
        .build_server(true)
        .build_transport(false) // Channels are built by the connection factory
        .compile_protos(
            &[
                "protos/sciobjsdb/storage/v1/models.proto",
                "protos/sciobjsdb/storage/v1/services.proto",
            ],
            &["protos"],
        )?;

    println!("cargo:rerun-if-changed=protos");

    Ok(())
}
