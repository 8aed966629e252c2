fn main() {
    envmatrix::app::cli::run();
}
