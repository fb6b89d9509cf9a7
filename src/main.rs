fn main() -> std::io::Result<()> {
    tabconv_lib::run()
}
