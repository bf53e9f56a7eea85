fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("PROTOC").is_err() {
        let protoc = protoc_bin_vendored::protoc_bin_path().map_err(|e| format!("{e:?}"))?;
        std::env::set_var("PROTOC", protoc);
    }
    tonic_prost_build::compile_protos("proto/lookup.proto")?;
    Ok(())
}
