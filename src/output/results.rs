use crate::ranking::RankOutcome;

/// Prints query results, best first, or the query's status
pub fn print_rank_outcome(query: &str, outcome: &RankOutcome) {
    match outcome {
        RankOutcome::EmptyQuery => println!("Nothing to search for in {:?}", query),
        RankOutcome::NoSignal => println!("No usable results for {:?}", query),
        RankOutcome::Ranked(results) => {
            println!("{} results for {:?}\n", results.len(), query);
            for (i, result) in results.iter().enumerate() {
                println!("{:>3}. {}", i + 1, result.document.title);
                println!("     {}", result.document.href);
                println!(
                    "     weight {:.4}  similarity {:.4}",
                    result.weight, result.similarity
                );
            }
        }
    }
}
