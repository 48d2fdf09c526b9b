use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use tracing::warn;

use crate::{
    catalog,
    error::{AppError, AppResult},
    histogram,
    input::Console,
    models::{FilterBounds, Movie, SearchOutcome},
    omdb::OmdbClient,
    site,
    store::MovieStore,
};

const NAME_ERROR: &str = "Invalid Input, Please enter a valid Movie name.";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MenuChoice {
    Exit,
    List,
    Add,
    Delete,
    Update,
    Stats,
    Random,
    Search,
    SortByRating,
    GenerateWebsite,
    SortByYear,
    Filter,
    Histogram,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 13] = [
        MenuChoice::Exit,
        MenuChoice::List,
        MenuChoice::Add,
        MenuChoice::Delete,
        MenuChoice::Update,
        MenuChoice::Stats,
        MenuChoice::Random,
        MenuChoice::Search,
        MenuChoice::SortByRating,
        MenuChoice::GenerateWebsite,
        MenuChoice::SortByYear,
        MenuChoice::Filter,
        MenuChoice::Histogram,
    ];

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::Exit => "Exit",
            MenuChoice::List => "List movies",
            MenuChoice::Add => "Add movie",
            MenuChoice::Delete => "Delete movie",
            MenuChoice::Update => "Update movie rating",
            MenuChoice::Stats => "Stats",
            MenuChoice::Random => "Random movie",
            MenuChoice::Search => "Search movie",
            MenuChoice::SortByRating => "Movies sorted by rating",
            MenuChoice::GenerateWebsite => "Generate website",
            MenuChoice::SortByYear => "Movies sorted chronologically",
            MenuChoice::Filter => "Filter movies",
            MenuChoice::Histogram => "Create rating histogram",
        }
    }
}

const LAST_CHOICE: usize = MenuChoice::ALL.len() - 1;

pub struct SitePaths {
    pub template: PathBuf,
    pub output: PathBuf,
}

pub struct Shell<R, W> {
    store: MovieStore,
    omdb: OmdbClient,
    site: SitePaths,
    console: Console<R, W>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(
        store: MovieStore,
        omdb: OmdbClient,
        site: SitePaths,
        console: Console<R, W>,
    ) -> Self {
        Self { store, omdb, site, console }
    }

    #[cfg(test)]
    pub fn into_console(self) -> Console<R, W> {
        self.console
    }

    /// Runs the menu loop until the user exits or input ends.
    pub async fn run(&mut self) -> AppResult<()> {
        loop {
            self.print_menu()?;

            let line = match self.console.read_line(&format!("Enter choice (0-{LAST_CHOICE}): ")) {
                Ok(line) => line,
                Err(AppError::InputClosed) => break,
                Err(err) => return Err(err),
            };

            let Ok(index) = line.parse::<i64>() else {
                writeln!(
                    self.console.out(),
                    "Invalid input. Please enter a number between 0 and {LAST_CHOICE}.\n"
                )?;
                continue;
            };
            let Some(choice) = MenuChoice::from_index(index) else {
                writeln!(
                    self.console.out(),
                    "Invalid choice! Please enter a number between 0 and {LAST_CHOICE}\n"
                )?;
                continue;
            };

            if choice == MenuChoice::Exit {
                break;
            }

            match self.dispatch(choice).await {
                Ok(()) => {},
                Err(AppError::InputClosed) => break,
                Err(AppError::Io(err)) => return Err(AppError::Io(err)),
                Err(err) => {
                    warn!(?choice, error = %err, "action failed");
                    writeln!(self.console.out(), "{err}\n")?;
                },
            }
        }

        writeln!(self.console.out(), "Bye!")?;
        Ok(())
    }

    fn print_menu(&mut self) -> AppResult<()> {
        let out = self.console.out();
        writeln!(out, "****** My Movies Database ******")?;
        for (i, choice) in MenuChoice::ALL.iter().enumerate() {
            writeln!(out, "{i}. {}", choice.label())?;
        }
        writeln!(out)?;
        Ok(())
    }

    async fn dispatch(&mut self, choice: MenuChoice) -> AppResult<()> {
        match choice {
            MenuChoice::Exit => Ok(()),
            MenuChoice::List => self.list().await,
            MenuChoice::Add => self.add().await,
            MenuChoice::Delete => self.delete().await,
            MenuChoice::Update => self.update().await,
            MenuChoice::Stats => self.stats().await,
            MenuChoice::Random => self.random().await,
            MenuChoice::Search => self.search().await,
            MenuChoice::SortByRating => self.sort_by_rating().await,
            MenuChoice::GenerateWebsite => self.generate_website().await,
            MenuChoice::SortByYear => self.sort_by_year().await,
            MenuChoice::Filter => self.filter().await,
            MenuChoice::Histogram => self.histogram().await,
        }
    }

    async fn list(&mut self) -> AppResult<()> {
        let movies = self.store.list().await?;
        self.print_movies(movies.iter())
    }

    async fn add(&mut self) -> AppResult<()> {
        let name = self.console.ask_text("Enter new movie name: ", NAME_ERROR)?;

        // Catch the obvious duplicate before spending a network round trip.
        if let Some(existing) = catalog::find_title(&self.store.list().await?, &name) {
            return Err(AppError::Duplicate(existing.title.clone()));
        }

        let Some(movie) = self.omdb.get_movie_info(&name).await else {
            return Err(AppError::lookup(&name, "no usable result"));
        };
        self.store.add(&movie).await?;
        writeln!(
            self.console.out(),
            "Movie {} ({}) added successfully.\n",
            movie.title,
            movie.year
        )?;
        Ok(())
    }

    async fn delete(&mut self) -> AppResult<()> {
        let name = self.console.ask_text("Enter movie name to delete: ", NAME_ERROR)?;
        let title = self.stored_title(&name).await?;

        self.store.delete(&title).await?;
        writeln!(self.console.out(), "Movie {title} successfully deleted.\n")?;
        Ok(())
    }

    async fn update(&mut self) -> AppResult<()> {
        let name = self.console.ask_text("Enter movie name to update: ", NAME_ERROR)?;
        let rating = self.console.ask_float(
            "Enter new rating (0-10): ",
            "Invalid Input, Please enter a valid Movie rating.",
        )?;
        let title = self.stored_title(&name).await?;

        self.store.update(&title, rating).await?;
        writeln!(self.console.out(), "Movie {title} successfully updated.\n")?;
        Ok(())
    }

    async fn stats(&mut self) -> AppResult<()> {
        let movies = self.store.list().await?;
        let out = self.console.out();
        let Some(stats) = catalog::stats(&movies) else {
            writeln!(out, "No movies in the database.\n")?;
            return Ok(());
        };

        writeln!(out, "Average rating: {:.2}", stats.average)?;
        writeln!(out, "Median rating: {:.2}", stats.median)?;
        writeln!(out, "Best movie: {}, {}", stats.best.title, rating(stats.best.rating))?;
        writeln!(out, "Worst movie: {}, {}\n", stats.worst.title, rating(stats.worst.rating))?;
        Ok(())
    }

    async fn random(&mut self) -> AppResult<()> {
        let movies = self.store.list().await?;
        let out = self.console.out();
        match catalog::random_pick(&movies, &mut rand::rng()) {
            Some(movie) => {
                let (title, shown) = (&movie.title, rating(movie.rating));
                writeln!(out, "Your movie for tonight: {title}, rated {shown}\n")?
            },
            None => writeln!(out, "No movies in the database.\n")?,
        }
        Ok(())
    }

    async fn search(&mut self) -> AppResult<()> {
        let term = self.console.ask_text("Enter part of the movie name to search: ", NAME_ERROR)?;
        let movies = self.store.list().await?;
        let out = self.console.out();

        match catalog::search(&movies, &term) {
            SearchOutcome::Matches(found) => {
                for movie in found {
                    writeln!(out, "{}, Rating: {}", movie.title, rating(movie.rating))?;
                }
            },
            SearchOutcome::Suggestion(suggestion) => {
                writeln!(out, "The movie \"{term}\" does not exist.")?;
                if let Some(movie) = suggestion {
                    writeln!(out, "Did you mean: {}, Rating: {}", movie.title, rating(movie.rating))?;
                }
            },
        }
        writeln!(out)?;
        Ok(())
    }

    async fn sort_by_rating(&mut self) -> AppResult<()> {
        let movies = self.store.list().await?;
        self.print_movies(catalog::sorted_by_rating(&movies).into_iter())
    }

    async fn generate_website(&mut self) -> AppResult<()> {
        let movies = self.store.list().await?;
        site::export_site(&movies, &self.site.template, &self.site.output).await?;
        writeln!(self.console.out(), "Website was generated successfully.\n")?;
        Ok(())
    }

    async fn sort_by_year(&mut self) -> AppResult<()> {
        let newest_first =
            self.console.ask_yes_no("Do you want to see the latest movies first? Y/N: ")?;
        let movies = self.store.list().await?;
        self.print_movies(catalog::sorted_by_year(&movies, newest_first).into_iter())
    }

    async fn filter(&mut self) -> AppResult<()> {
        let defaults = FilterBounds::default();
        let min_rating = self.console.ask_optional_float(
            "Enter minimum rating (leave blank for no minimum rating): ",
            "Invalid Input, Please enter a valid Movie rating",
        )?;
        let start_year = self.console.ask_optional_integer(
            "Enter start year (leave blank for no start year): ",
            "Invalid Input, Please enter a valid Movie start year",
        )?;
        let end_year = self.console.ask_optional_integer(
            "Enter end year (leave blank for no end year): ",
            "Invalid Input, Please enter a valid Movie end year",
        )?;

        let bounds = FilterBounds {
            min_rating: min_rating.unwrap_or(defaults.min_rating),
            start_year: start_year.map_or(defaults.start_year, clamp_year),
            end_year: end_year.map_or(defaults.end_year, clamp_year),
        };

        let movies = self.store.list().await?;
        writeln!(self.console.out(), "Filtered movies:")?;
        self.print_movies(catalog::filter(&movies, &bounds).into_iter())
    }

    async fn histogram(&mut self) -> AppResult<()> {
        let filename = self.console.ask_text(
            "Enter the filename to save the histogram (e.g., ratings.png): ",
            "Invalid Input, Please enter a valid filename.",
        )?;
        let movies = self.store.list().await?;
        if movies.is_empty() {
            writeln!(self.console.out(), "No movies in the database.\n")?;
            return Ok(());
        }

        let bins = histogram::save_rating_histogram(&movies, Path::new(&filename))?;
        let out = self.console.out();
        for bin in bins {
            writeln!(out, "{:>5.2} - {:>5.2}: {}", bin.start, bin.end, bin.count)?;
        }
        writeln!(out, "Histogram saved to {filename}\n")?;
        Ok(())
    }

    /// The stored spelling of `name`, matched ignoring case against a fresh listing.
    async fn stored_title(&self, name: &str) -> AppResult<String> {
        let movies = self.store.list().await?;
        catalog::find_title(&movies, name)
            .map(|m| m.title.clone())
            .ok_or_else(|| AppError::NotFound(name.to_string()))
    }

    fn print_movies<'a>(
        &mut self,
        movies: impl ExactSizeIterator<Item = &'a Movie>,
    ) -> AppResult<()> {
        let out = self.console.out();
        writeln!(out, "\n{} movies in total", movies.len())?;
        for movie in movies {
            writeln!(out, "{} ({}) : {}", movie.title, movie.year, rating(movie.rating))?;
        }
        writeln!(out)?;
        Ok(())
    }
}

/// Shortest form that reads back as the stored value, keeping one decimal for
/// whole numbers (`9.0`, `7.25`).
fn rating(value: f64) -> String {
    if value.fract() == 0.0 { format!("{value:.1}") } else { value.to_string() }
}

fn clamp_year(year: i64) -> i32 {
    year.clamp(i32::MIN.into(), i32::MAX.into()) as i32
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use serde_json::json;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

    use super::*;
    use crate::{omdb, store::tests::seeded_store};

    type TestShell = Shell<Cursor<Vec<u8>>, Vec<u8>>;

    fn fixture() -> Vec<Movie> {
        vec![
            Movie::new("Gladiator", 2000, 8.5, "https://img.example/gladiator.jpg"),
            Movie::new("Inception", 2010, 8.8, "https://img.example/inception.jpg"),
            Movie::new("The Room", 2003, 3.6, "https://img.example/room.jpg"),
        ]
    }

    fn offline_omdb() -> OmdbClient {
        OmdbClient::new(reqwest::Client::new(), String::new(), "http://127.0.0.1:9".to_string())
    }

    fn shell(store: MovieStore, omdb: OmdbClient, site: SitePaths, input: &str) -> TestShell {
        let console = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        Shell::new(store, omdb, site, console)
    }

    fn no_site() -> SitePaths {
        SitePaths { template: PathBuf::from("missing.html"), output: PathBuf::from("unused.html") }
    }

    async fn run(mut shell: TestShell) -> String {
        shell.run().await.unwrap();
        String::from_utf8(shell.into_console().into_output()).unwrap()
    }

    #[tokio::test]
    async fn exit_and_invalid_choices() {
        let (_dir, store) = seeded_store(&[]).await;
        let out = run(shell(store, offline_omdb(), no_site(), "abc\n42\n0\n")).await;

        assert!(out.contains("0. Exit"));
        assert!(out.contains("12. Create rating histogram"));
        assert!(out.contains("Invalid input. Please enter a number between 0 and 12."));
        assert!(out.contains("Invalid choice! Please enter a number between 0 and 12"));
        assert!(out.trim_end().ends_with("Bye!"));
    }

    #[tokio::test]
    async fn end_of_input_exits_cleanly() {
        let (_dir, store) = seeded_store(&[]).await;
        let out = run(shell(store, offline_omdb(), no_site(), "1\n")).await;
        assert!(out.contains("0 movies in total"));
        assert!(out.trim_end().ends_with("Bye!"));
    }

    #[tokio::test]
    async fn list_prints_every_movie() {
        let (_dir, store) = seeded_store(&fixture()).await;
        let out = run(shell(store, offline_omdb(), no_site(), "1\n0\n")).await;

        assert!(out.contains("3 movies in total"));
        assert!(out.contains("Gladiator (2000) : 8.5"));
        assert!(out.contains("The Room (2003) : 3.6"));
    }

    #[tokio::test]
    async fn add_looks_up_and_stores() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Response": "True",
                "Title": "The Matrix",
                "Year": "1999",
                "imdbRating": "8.7",
                "Poster": "https://img.example/matrix.jpg"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, store) = seeded_store(&[]).await;
        let omdb = omdb::tests::client_for(&server);
        let out = run(shell(store.clone(), omdb, no_site(), "2\nmatrix\n0\n")).await;

        assert!(out.contains("Movie The Matrix (1999) added successfully."));
        assert_eq!(
            store.list().await.unwrap(),
            vec![Movie::new("The Matrix", 1999, 8.7, "https://img.example/matrix.jpg")]
        );
    }

    #[tokio::test]
    async fn add_duplicate_skips_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let (_dir, store) = seeded_store(&fixture()).await;
        let omdb = omdb::tests::client_for(&server);
        let out = run(shell(store.clone(), omdb, no_site(), "2\nINCEPTION\n0\n")).await;

        assert!(out.contains("Movie Inception is already in the database."));
        assert_eq!(store.list().await.unwrap(), fixture());
    }

    #[tokio::test]
    async fn add_failed_lookup_creates_nothing() {
        let (_dir, store) = seeded_store(&fixture()).await;
        let out = run(shell(store.clone(), offline_omdb(), no_site(), "2\nHeat\n0\n")).await;

        assert!(out.contains("Movie lookup for \"Heat\" failed"));
        assert_eq!(store.list().await.unwrap(), fixture());
    }

    #[tokio::test]
    async fn delete_matches_ignoring_case() {
        let (_dir, store) = seeded_store(&fixture()).await;
        let input = "3\nthe room\n3\nHeat\n0\n";
        let out = run(shell(store.clone(), offline_omdb(), no_site(), input)).await;

        assert!(out.contains("Movie The Room successfully deleted."));
        assert!(out.contains("Movie Heat doesn't exist."));
        assert_eq!(store.list().await.unwrap(), fixture()[..2].to_vec());
    }

    #[tokio::test]
    async fn update_is_visible_to_later_actions() {
        let (_dir, store) = seeded_store(&fixture()).await;
        let input = "4\nthe room\n9.9\n5\n0\n";
        let out = run(shell(store.clone(), offline_omdb(), no_site(), input)).await;

        assert!(out.contains("Movie The Room successfully updated."));
        assert!(out.contains("Best movie: The Room, 9.9"));
        assert_eq!(store.list().await.unwrap()[2].rating, 9.9);
    }

    #[tokio::test]
    async fn stats_on_empty_collection() {
        let (_dir, store) = seeded_store(&[]).await;
        let out = run(shell(store, offline_omdb(), no_site(), "5\n6\n0\n")).await;
        assert_eq!(out.matches("No movies in the database.").count(), 2);
    }

    #[tokio::test]
    async fn search_reports_matches_and_suggestions() {
        let (_dir, store) = seeded_store(&fixture()).await;
        let input = "7\nCEP\n7\ngladiatr\n7\nzzz\n0\n";
        let out = run(shell(store, offline_omdb(), no_site(), input)).await;

        assert!(out.contains("Inception, Rating: 8.8"));
        assert!(out.contains("The movie \"gladiatr\" does not exist."));
        assert!(out.contains("Did you mean: Gladiator, Rating: 8.5"));
        assert!(out.contains("The movie \"zzz\" does not exist."));
        assert_eq!(out.matches("Did you mean").count(), 1);
    }

    #[tokio::test]
    async fn sorting_actions() {
        let (_dir, store) = seeded_store(&fixture()).await;
        let out = run(shell(store, offline_omdb(), no_site(), "8\n10\nmaybe\ny\n0\n")).await;

        // first occurrences come from the rating sort
        assert!(out.find("Inception (2010)").unwrap() < out.find("Gladiator (2000)").unwrap());
        let newest = out.rfind("Inception (2010)").unwrap();
        let middle = out.rfind("The Room (2003)").unwrap();
        let oldest = out.rfind("Gladiator (2000)").unwrap();
        assert!(newest < middle && middle < oldest);
    }

    #[tokio::test]
    async fn filter_with_and_without_bounds() {
        let (_dir, store) = seeded_store(&fixture()).await;
        let input = "11\n8.5\n2000\n2015\n11\n\n\n\n0\n";
        let out = run(shell(store, offline_omdb(), no_site(), input)).await;

        assert!(out.contains("Filtered movies:\n\n2 movies in total"));
        assert!(out.contains("Filtered movies:\n\n3 movies in total"));
    }

    #[tokio::test]
    async fn generate_website_reports_missing_template_and_continues() {
        let (_dir, store) = seeded_store(&fixture()).await;
        let out = run(shell(store, offline_omdb(), no_site(), "9\n1\n0\n")).await;

        assert!(out.contains("could not read site template missing.html"));
        assert!(out.contains("3 movies in total"));
    }

    #[tokio::test]
    async fn failed_website_write_keeps_the_menu_running() {
        let (dir, store) = seeded_store(&fixture()).await;
        let template = dir.path().join("template.html");
        tokio::fs::write(&template, site::GRID_PLACEHOLDER).await.unwrap();

        let output = dir.path().join("no_such_dir").join("index.html");
        let paths = SitePaths { template, output: output.clone() };
        let out = run(shell(store, offline_omdb(), paths, "9\n1\n0\n")).await;

        assert!(out.contains("could not write website"));
        assert!(out.contains("3 movies in total"));
        assert!(out.trim_end().ends_with("Bye!"));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn ratings_print_as_stored() {
        let (_dir, store) = seeded_store(&fixture()).await;
        let input = "4\ngladiator\n7.25\n4\ninception\n9\n1\n0\n";
        let out = run(shell(store, offline_omdb(), no_site(), input)).await;

        assert!(out.contains("Gladiator (2000) : 7.25"));
        assert!(out.contains("Inception (2010) : 9.0"));
    }

    #[tokio::test]
    async fn generate_website_writes_page() {
        let (dir, store) = seeded_store(&fixture()).await;
        let template = dir.path().join("template.html");
        let output = dir.path().join("index.html");
        tokio::fs::write(&template, site::GRID_PLACEHOLDER).await.unwrap();

        let paths = SitePaths { template, output: output.clone() };
        let out = run(shell(store, offline_omdb(), paths, "9\n0\n")).await;

        assert!(out.contains("Website was generated successfully."));
        let page = tokio::fs::read_to_string(output).await.unwrap();
        assert_eq!(page.matches("<li>").count(), 3);
    }

    #[tokio::test]
    async fn histogram_saves_file() {
        let (dir, store) = seeded_store(&fixture()).await;
        let path = dir.path().join("ratings.png");
        let input = format!("12\n{}\n0\n", path.display());

        let out = run(shell(store, offline_omdb(), no_site(), &input)).await;

        assert!(out.contains("Histogram saved to"));
        assert!(path.exists());
    }

    #[test]
    fn rating_formatting() {
        assert_eq!(rating(9.0), "9.0");
        assert_eq!(rating(7.25), "7.25");
        assert_eq!(rating(8.8), "8.8");
    }

    #[test]
    fn menu_indices() {
        assert_eq!(MenuChoice::from_index(0), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::from_index(11), Some(MenuChoice::Filter));
        assert_eq!(MenuChoice::from_index(13), None);
        assert_eq!(MenuChoice::from_index(-1), None);
    }
}
