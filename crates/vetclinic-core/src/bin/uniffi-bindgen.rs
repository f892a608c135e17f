fn main() -> anyhow::Result<()> {
    uniffi::uniffi_bindgen_main();
    Ok(())
}
