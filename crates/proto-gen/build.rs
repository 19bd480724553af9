// Build script to compile Protocol Buffer definitions

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile protobuf files (messages, client stub and server trait)
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["../../proto/course_check.proto"], &["../../proto/"])?;

    // Tell Cargo to rerun if proto files change
    println!("cargo:rerun-if-changed=../../proto/course_check.proto");

    Ok(())
}
