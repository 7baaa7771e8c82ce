use name_gen_core::model::{GenerationInput, Generator, RngSource, StartSeed, WalkEnd};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init();

	// Load all corpora from the "data" directory (.dat files) as 1-gram models
	// Load automatically .1.bin if existing
	// Corpus names are single words: with 2-grams every name would be copied
	let generator = Generator::from_directory("./data", 1)?;
	println!("Loaded corpora: {}", generator.corpus_names().join(", "));

	// Create a generation input with default values
	let mut input = GenerationInput::default();

	// Number of retries if the generated name is already in a corpus
	input.nb_try = 100;

	// A walk may cycle forever: stop reading it after this many tokens
	input.set_max_tokens(48)?;

	// Attempting to set an invalid cap
	match input.set_max_tokens(0) {
		Ok(_) => println!("Should not happen"),
		Err(e) => println!("Invalid cap rejected: {e}"),
	}

	// 'Flush' keeps the last tokens of the walk when it reaches the end
	// of the corpus, 'Stop' drops them
	input.walk_end = WalkEnd::Flush;

	// Start seed can be set to
	// 'Uppercase' to start on a capitalized word (names, sentences)
	// 'Token' to start on a given word
	// 'Any' to start anywhere
	input.start_seed = StartSeed::Uppercase;

	// Generate 10 entries
	let mut rng = RngSource::thread();
	for i in 0..10 {
		let entry = generator.predict(&input, &mut rng)?;
		println!("Generated framework {}: {} - {}", i + 1, entry.name, entry.description);
	}

	// Same seed, same walks (start inside a description)
	input.start_seed = StartSeed::Token("A".to_owned());
	let first = generator.predict(&input, &mut RngSource::seeded(42))?;
	let second = generator.predict(&input, &mut RngSource::seeded(42))?;
	assert_eq!(first, second);
	println!("Seeded: {} - {}", first.name, first.description);

	// Attempting to start on a word that never begins a prefix
	input.start_seed = StartSeed::Token("Cobol".to_owned());
	match generator.predict(&input, &mut rng) {
		Ok(_) => println!("Should not happen"),
		Err(e) => println!("Start 'Cobol' rejected: {e}"),
	}

	Ok(())
}
