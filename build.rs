fn main() {
    // ESP-IDF build environment propagation. With the espidf feature off
    // (host builds, tests) this build script is a no-op.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
