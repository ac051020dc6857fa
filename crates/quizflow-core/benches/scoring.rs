use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizflow_core::answers::normalize;
use quizflow_core::model::{AnswerSelection, Question, UserAnswers};
use quizflow_core::scoring::{classify, score};

fn make_question(i: usize, correct: usize) -> Question {
    let options: Vec<String> = (0..6).map(|o| format!("Option {o} of question {i}")).collect();
    let correct_answers = options[..correct].to_vec();
    Question::new(format!("Question {i}?"), options, correct_answers)
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    let single = make_question(0, 1);
    let multi = make_question(1, 3);

    group.bench_function("single_correct", |b| {
        let answer: AnswerSelection = [" option 0 of question 0 "].into_iter().collect();
        b.iter(|| classify(black_box(&single), black_box(&answer)))
    });

    group.bench_function("multi_partial", |b| {
        let answer: AnswerSelection = ["Option 0 of question 1", "Option 5 of question 1"]
            .into_iter()
            .collect();
        b.iter(|| classify(black_box(&multi), black_box(&answer)))
    });

    group.bench_function("normalize_6", |b| {
        b.iter(|| normalize(black_box(multi.options())))
    });

    group.finish();
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");

    for n in [5usize, 20, 200] {
        let questions: Vec<Question> = (0..n).map(|i| make_question(i, 1 + i % 3)).collect();
        let answers: UserAnswers = questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                q.correct_answers()
                    .iter()
                    .take(1 + i % 2)
                    .cloned()
                    .collect::<AnswerSelection>()
            })
            .collect();

        group.bench_function(format!("n={n}"), |b| {
            b.iter(|| score(black_box(&questions), black_box(&answers)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify, bench_score);
criterion_main!(benches);
