fn main() {
    weld_charts::cli::run();
}
