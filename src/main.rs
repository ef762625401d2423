fn main() -> anyhow::Result<()> {
    remaining_lib::run()
}
